// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Lagoon Sandbox
// Interactive water scene for trying the renderer and its configuration

mod app;
mod camera;
mod scene;

use anyhow::{Context, Result};
use app::SandboxApp;
use clap::Parser;
use lagoon_data::LagoonConfig;
use std::path::PathBuf;
use winit::event_loop::{ControlFlow, EventLoop};

/// Command line options.
#[derive(Debug, Parser)]
#[command(name = "sandbox", version, about = "Interactive lagoon water renderer")]
pub struct Args {
    /// RON configuration file, reloaded with R. Defaults are used without one.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Initial window width in pixels.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,
    /// Initial window height in pixels.
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("wgpu_hal", log::LevelFilter::Error)
        .filter_module("naga", log::LevelFilter::Warn)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => LagoonConfig::load(path)
            .with_context(|| format!("Failed to load configuration '{}'", path.display()))?,
        None => LagoonConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = SandboxApp::new(args, config);
    event_loop.run_app(&mut app)?;
    app.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_open_a_720p_window() {
        let args = Args::parse_from(["sandbox"]);
        assert_eq!((args.width, args.height), (1280, 720));
        assert!(args.config.is_none());
    }

    #[test]
    fn config_path_and_size_are_read() {
        let args = Args::parse_from([
            "sandbox",
            "--config",
            "assets/lagoon.ron",
            "--width",
            "800",
            "--height",
            "600",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("assets/lagoon.ron")));
        assert_eq!((args.width, args.height), (800, 600));
    }
}
