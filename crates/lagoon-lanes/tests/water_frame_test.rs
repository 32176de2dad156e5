mod common;

use common::{drawn_meshes, pass, states, uniform_writes, Command, MockGraphicsDevice};
use lagoon_core::math::{Extent2D, LinearRgba, Plane, Vec3};
use lagoon_core::renderer::{
    BlendState, CompareFunction, GraphicsDevice, LightKind, MeshId, PointLight, RenderError,
    RenderTarget, ResourceError, ShaderProgram, UniformValue, Viewport,
};
use lagoon_data::geometry::{build_cube, build_grid};
use lagoon_data::{
    Camera, LagoonConfig, MaterialHandle, Model, ReflectionResizePolicy, Scene, SceneNode,
    Transform,
};
use lagoon_lanes::materials::{default_lit, skybox, water, MaterialLibrary};
use lagoon_lanes::{
    FrameStats, LaneError, MaterialRegistry, Skybox, VisitError, WaterRenderer, REFLECTION_CLIP,
    REFLECTION_STRENGTH, REFLECTION_TEXTURE,
};
use std::sync::Arc;

const EYE: Vec3 = Vec3::new(0.0, 3.0, 6.0);

struct Lagoon {
    device: MockGraphicsDevice,
    library: MaterialLibrary,
    renderer: WaterRenderer,
    opaque: Scene,
    transparent: Scene,
    cube_mesh: MeshId,
    water_mesh: MeshId,
    water: MaterialHandle,
}

impl Lagoon {
    fn frame(&mut self) -> Result<FrameStats, LaneError> {
        self.renderer
            .render_frame(&self.device, &self.opaque, &self.transparent, 1.5)
    }
}

fn lagoon_on(device: MockGraphicsDevice, point_lights: usize) -> Lagoon {
    let mut registry = MaterialRegistry::new();
    let library = MaterialLibrary::build(&device, &mut registry).unwrap();
    let cube = build_cube().upload(&device, "crate").unwrap();
    let grid = build_grid(8, 8).unwrap().upload(&device, "water").unwrap();

    let mut opaque = Scene::new("opaque");
    opaque.add_node(SceneNode::camera(
        "eye",
        Transform::looking_at(EYE, Vec3::ZERO, Vec3::Y),
        Camera::default(),
    ));
    for i in 0..point_lights {
        opaque.add_node(SceneNode::light(
            format!("lamp {i}"),
            Transform::from_translation(Vec3::new(i as f32, 2.0, 0.0)),
            LightKind::Point(PointLight::default()),
        ));
    }
    let crate_material =
        default_lit::material(&library.default_lit, "crate", LinearRgba::rgb(0.8, 0.5, 0.2))
            .unwrap();
    opaque.add_node(SceneNode::model(
        "crate",
        Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        Model::with_material(cube.clone(), crate_material),
    ));

    let water = water::material(&library.water, &LagoonConfig::default()).unwrap();
    let mut transparent = Scene::new("transparent");
    transparent.add_node(SceneNode::model(
        "water",
        Transform::IDENTITY.with_scale(Vec3::splat(20.0)),
        Model::with_material(grid.clone(), water.clone()),
    ));

    let mut renderer = WaterRenderer::new(registry, device.surface_size());
    renderer.add_reflective_material(water.clone()).unwrap();

    Lagoon {
        device,
        library,
        renderer,
        opaque,
        transparent,
        cube_mesh: cube.id(),
        water_mesh: grid.id(),
        water,
    }
}

fn lagoon(point_lights: usize) -> Lagoon {
    lagoon_on(MockGraphicsDevice::new(800, 600), point_lights)
}

#[test]
fn opaque_geometry_is_drawn_before_the_water() {
    let mut l = lagoon(1);
    let stats = l.frame().unwrap();
    assert_eq!(stats.opaque_drawcalls, 1);
    assert_eq!(stats.transparent_drawcalls, 1);
    assert_eq!(stats.lights, 1);
    assert_eq!(stats.main_draws, 2);
    assert_eq!(stats.reflection_draws, 0);

    let commands = l.device.take_commands();
    assert_eq!(commands[0], Command::BeginPass(RenderTarget::Surface));
    assert_eq!(
        commands[1],
        Command::Viewport(Viewport::from_extent(Extent2D::new(800, 600)))
    );
    assert_eq!(drawn_meshes(&commands), vec![l.cube_mesh, l.water_mesh]);
    assert_eq!(commands.last(), Some(&Command::Submit));
}

#[test]
fn reflection_is_captured_first_with_the_clip_plane() {
    let mut l = lagoon(1);
    l.renderer
        .enable_reflection(&l.device, 0.5, ReflectionResizePolicy::Fixed)
        .unwrap();
    assert_eq!(l.renderer.reflection_size(), Some(Extent2D::new(512, 512)));
    let texture = l.renderer.reflection_texture().unwrap();
    assert_eq!(
        l.water.read().uniform_value(REFLECTION_TEXTURE),
        Some(UniformValue::Texture(texture))
    );

    let stats = l.frame().unwrap();
    assert_eq!(stats.reflection_draws, 1);
    assert_eq!(stats.main_draws, 2);

    let commands = l.device.take_commands();
    let reflection = pass(&commands, 0);
    assert!(matches!(
        reflection[0],
        Command::BeginPass(RenderTarget::Offscreen(_))
    ));
    assert_eq!(reflection[1], Command::Feature(REFLECTION_CLIP, true));
    assert_eq!(
        reflection[2],
        Command::Viewport(Viewport::from_extent(Extent2D::new(512, 512)))
    );
    assert_eq!(
        reflection[reflection.len() - 2],
        Command::Feature(REFLECTION_CLIP, false)
    );
    assert_eq!(reflection.last(), Some(&Command::EndPass));
    assert_eq!(drawn_meshes(reflection), vec![l.cube_mesh]);

    let lit = l.library.default_lit.id();
    let clip = l.library.default_lit.uniform("ClipPlane").unwrap();
    let eye = l.library.default_lit.uniform("CameraPosition").unwrap();
    assert_eq!(
        uniform_writes(reflection, lit, clip),
        vec![UniformValue::Vec4(Plane::horizontal(0.5).to_vec4())]
    );
    assert_eq!(
        uniform_writes(reflection, lit, eye),
        vec![UniformValue::Vec3(Vec3::new(EYE.x, 1.0 - EYE.y, EYE.z))]
    );

    let main = pass(&commands, 1);
    assert_eq!(main[0], Command::BeginPass(RenderTarget::Surface));
    assert_eq!(
        uniform_writes(main, lit, clip),
        vec![UniformValue::Vec4(Plane::PASS_THROUGH)]
    );
    assert!(main.contains(&Command::Texture(0, texture)));
    assert_eq!(drawn_meshes(main), vec![l.cube_mesh, l.water_mesh]);

    let strength = l.library.water.uniform(REFLECTION_STRENGTH).unwrap();
    assert_eq!(
        uniform_writes(main, l.library.water.id(), strength),
        vec![UniformValue::Float(1.0)]
    );
}

#[test]
fn lights_beyond_capacity_take_extra_batches() {
    let mut l = lagoon(5);
    let stats = l.frame().unwrap();
    assert_eq!(stats.lights, 5);
    assert_eq!(stats.main_draws, 4);

    let commands = l.device.take_commands();
    assert_eq!(
        drawn_meshes(&commands),
        vec![l.cube_mesh, l.cube_mesh, l.water_mesh, l.water_mesh]
    );

    let states = states(&commands);
    assert_eq!(states[0].blend, None);
    assert!(states[0].depth.write);
    assert_eq!(states[1].blend, Some(BlendState::ADDITIVE));
    assert!(!states[1].depth.write);
    assert_eq!(states[1].depth.compare, CompareFunction::LessEqual);
    assert_eq!(states[2].blend, Some(BlendState::ALPHA_BLENDING));
    assert_eq!(states[3].blend, Some(BlendState::ALPHA_ADDITIVE));

    let lit = l.library.default_lit.id();
    let count = l.library.default_lit.uniform("LightCount").unwrap();
    let indirect = l.library.default_lit.uniform("LightIndirect").unwrap();
    assert_eq!(
        uniform_writes(&commands, lit, count),
        vec![UniformValue::Int(4), UniformValue::Int(1)]
    );
    assert_eq!(
        uniform_writes(&commands, lit, indirect),
        vec![UniformValue::Int(1), UniformValue::Int(0)]
    );
}

#[test]
fn lights_filling_whole_batches_take_no_extra_draw() {
    let mut l = lagoon(4);
    let stats = l.frame().unwrap();
    assert_eq!(stats.lights, 4);
    assert_eq!(stats.main_draws, 2);

    let mut l = lagoon(8);
    let stats = l.frame().unwrap();
    assert_eq!(stats.lights, 8);
    assert_eq!(stats.main_draws, 4);

    let commands = l.device.take_commands();
    let lit = l.library.default_lit.id();
    let count = l.library.default_lit.uniform("LightCount").unwrap();
    assert_eq!(
        uniform_writes(&commands, lit, count),
        vec![UniformValue::Int(4), UniformValue::Int(4)]
    );
}

#[test]
fn unlit_scene_draws_each_entry_once_with_ambient_only() {
    let mut l = lagoon(0);
    let stats = l.frame().unwrap();
    assert_eq!(stats.main_draws, 2);

    let commands = l.device.take_commands();
    let lit = l.library.default_lit.id();
    let count = l.library.default_lit.uniform("LightCount").unwrap();
    let indirect = l.library.default_lit.uniform("LightIndirect").unwrap();
    assert_eq!(
        uniform_writes(&commands, lit, count),
        vec![UniformValue::Int(0)]
    );
    assert_eq!(
        uniform_writes(&commands, lit, indirect),
        vec![UniformValue::Int(1)]
    );
}

#[test]
fn sky_is_drawn_once_between_opaque_and_transparent() {
    let mut l = lagoon(5);
    let sky_mesh = build_cube().upload(&l.device, "sky").unwrap();
    let sky = skybox::material(&l.library.skybox, Vec3::new(0.3, -1.0, 0.2)).unwrap();
    let sky_id = sky_mesh.id();
    l.renderer
        .set_skybox(Some(Skybox::new(&Model::with_material(sky_mesh, sky))));

    l.frame().unwrap();
    let commands = l.device.take_commands();
    assert_eq!(
        drawn_meshes(&commands),
        vec![l.cube_mesh, l.cube_mesh, sky_id, l.water_mesh, l.water_mesh]
    );
    let sky_state = states(&commands)[2];
    assert!(!sky_state.depth.write);
    assert_eq!(sky_state.depth.compare, CompareFunction::LessEqual);
    assert_eq!(sky_state.blend, None);
}

#[test]
fn toggling_blend_moves_the_water_between_collections() {
    let mut l = lagoon(1);
    water::set_transparent(&l.water, false);
    let stats = l.frame().unwrap();
    assert_eq!(stats.opaque_drawcalls, 2);
    assert_eq!(stats.transparent_drawcalls, 0);
    let commands = l.device.take_commands();
    assert_eq!(drawn_meshes(&commands), vec![l.cube_mesh, l.water_mesh]);
    assert_eq!(states(&commands)[1].blend, None);
    assert!(states(&commands)[1].depth.write);

    water::set_transparent(&l.water, true);
    let stats = l.frame().unwrap();
    assert_eq!(stats.opaque_drawcalls, 1);
    assert_eq!(stats.transparent_drawcalls, 1);
    assert_eq!(l.renderer.context().transparent().len(), 1);
}

#[test]
fn frame_without_camera_fails_in_the_first_pass() {
    let mut l = lagoon(1);
    let empty = Scene::new("empty");
    let err = l
        .renderer
        .render_frame(&l.device, &empty, &l.transparent, 0.0)
        .unwrap_err();
    assert!(matches!(
        err,
        LaneError::Render(RenderError::MissingCamera {
            pass: "MainForward"
        })
    ));

    l.renderer
        .enable_reflection(&l.device, 0.0, ReflectionResizePolicy::Fixed)
        .unwrap();
    let err = l
        .renderer
        .render_frame(&l.device, &empty, &l.transparent, 0.0)
        .unwrap_err();
    assert!(matches!(
        err,
        LaneError::Render(RenderError::MissingCamera {
            pass: "PlanarReflection"
        })
    ));
    assert!(!l.device.take_commands().contains(&Command::Submit));
}

#[test]
fn second_camera_is_rejected() {
    let mut l = lagoon(1);
    l.transparent.add_node(SceneNode::camera(
        "spy",
        Transform::IDENTITY,
        Camera::default(),
    ));
    let err = l.frame().unwrap_err();
    assert!(matches!(
        err,
        LaneError::Visit(VisitError::CameraAlreadyRegistered { ref node, .. }) if node == "spy"
    ));
}

#[test]
fn missing_clip_support_fails_the_reflection_pass() {
    let mut l = lagoon_on(MockGraphicsDevice::without_clip(800, 600), 1);
    l.renderer
        .enable_reflection(&l.device, 0.0, ReflectionResizePolicy::Fixed)
        .unwrap();
    let err = l.frame().unwrap_err();
    assert!(matches!(
        err,
        LaneError::Render(RenderError::FeatureUnsupported(f)) if f == REFLECTION_CLIP
    ));
}

#[test]
fn unregistered_program_is_reported() {
    let mut l = lagoon(1);
    let stray = Arc::new(ShaderProgram::build(&l.device, &default_lit::descriptor()).unwrap());
    let material = default_lit::material(&stray, "stray", LinearRgba::WHITE).unwrap();
    let mesh = build_cube().upload(&l.device, "stray").unwrap();
    l.opaque.add_node(SceneNode::model(
        "stray",
        Transform::IDENTITY,
        Model::with_material(mesh, material),
    ));
    let err = l.frame().unwrap_err();
    assert!(matches!(
        err,
        LaneError::Render(RenderError::UnregisteredProgram(id)) if id == stray.id()
    ));
}

#[test]
fn follow_window_reallocates_and_rebinds_the_target() {
    let mut l = lagoon(1);
    l.renderer
        .enable_reflection(&l.device, 0.0, ReflectionResizePolicy::FollowWindow)
        .unwrap();
    let before = l.renderer.reflection_texture().unwrap();
    assert_eq!(l.device.live_textures(), 2);

    // Same power-of-two side: nothing to do.
    l.renderer
        .resize(&l.device, Extent2D::new(1000, 700))
        .unwrap();
    assert_eq!(l.renderer.reflection_texture(), Some(before));

    l.renderer
        .resize(&l.device, Extent2D::new(1280, 720))
        .unwrap();
    let after = l.renderer.reflection_texture().unwrap();
    assert_ne!(after, before);
    assert_eq!(l.device.texture_size(before), None);
    assert_eq!(l.device.texture_size(after), Some(Extent2D::new(1024, 1024)));
    assert_eq!(l.device.live_textures(), 2);
    assert_eq!(l.device.live_targets(), 1);
    assert_eq!(
        l.water.read().uniform_value(REFLECTION_TEXTURE),
        Some(UniformValue::Texture(after))
    );
}

#[test]
fn fixed_target_ignores_resizes() {
    let mut l = lagoon(1);
    l.renderer
        .enable_reflection(&l.device, 0.0, ReflectionResizePolicy::Fixed)
        .unwrap();
    l.renderer
        .resize(&l.device, Extent2D::new(1920, 1080))
        .unwrap();
    assert_eq!(l.renderer.reflection_size(), Some(Extent2D::new(512, 512)));
    assert_eq!(l.renderer.context().window_size(), Extent2D::new(1920, 1080));
}

#[test]
fn disabling_reflection_releases_the_target() {
    let mut l = lagoon(1);
    l.renderer
        .enable_reflection(&l.device, 0.0, ReflectionResizePolicy::Fixed)
        .unwrap();
    l.renderer.disable_reflection(&l.device).unwrap();
    assert_eq!(l.device.live_textures(), 0);
    assert_eq!(l.device.live_targets(), 0);

    let stats = l.frame().unwrap();
    assert_eq!(stats.reflection_draws, 0);
    let commands = l.device.take_commands();
    let passes = commands
        .iter()
        .filter(|c| matches!(c, Command::BeginPass(_)))
        .count();
    assert_eq!(passes, 1);
}

#[test]
fn disabled_reflection_is_no_longer_sampled() {
    let mut l = lagoon(1);
    l.renderer
        .enable_reflection(&l.device, 0.0, ReflectionResizePolicy::Fixed)
        .unwrap();
    let released = l.renderer.reflection_texture().unwrap();
    l.renderer.disable_reflection(&l.device).unwrap();
    assert_eq!(l.water.read().uniform_value(REFLECTION_TEXTURE), None);

    l.frame().unwrap();
    let commands = l.device.take_commands();
    assert!(!commands
        .iter()
        .any(|c| matches!(c, Command::Texture(_, t) if *t == released)));
    let strength = l.library.water.uniform(REFLECTION_STRENGTH).unwrap();
    assert_eq!(
        uniform_writes(&commands, l.library.water.id(), strength),
        vec![UniformValue::Float(0.0)]
    );
}

#[test]
fn reflective_materials_need_the_reflection_slot() {
    let mut l = lagoon(1);
    let crate_material =
        default_lit::material(&l.library.default_lit, "crate", LinearRgba::WHITE).unwrap();
    assert!(l.renderer.add_reflective_material(crate_material).is_err());
}

#[test]
fn a_rejected_pass_aborts_the_frame() {
    let mut l = lagoon(1);
    l.device
        .fail_next_pass(ResourceError::InvalidHandle.into());
    let err = l.frame().unwrap_err();
    assert!(matches!(
        err,
        LaneError::Render(RenderError::ResourceError(ResourceError::InvalidHandle))
    ));
    let commands = l.device.take_commands();
    assert!(!commands.contains(&Command::EndPass));
    assert!(!commands.contains(&Command::Submit));
}

#[test]
fn minimized_window_skips_the_frame() {
    let mut l = lagoon(1);
    l.device.set_surface_size(0, 600);
    assert_eq!(l.frame().unwrap(), FrameStats::default());
    assert!(l.device.take_commands().is_empty());
}
