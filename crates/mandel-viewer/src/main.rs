//! Mandelbrot viewer.
//!
//! Draws the set with a fragment shader over a full-window quad.
//!
//! # Usage
//!
//! ```bash
//! mandel-viewer
//! mandel-viewer --width 800 --height 600
//! mandel-viewer --config viewer.toml --log debug
//! ```
//!
//! # Controls
//!
//! - Drag (left button): pan
//! - Wheel: zoom about the pointer
//! - Ctrl + wheel: raise / lower the iteration count
//! - ESC: quit

mod app;
mod cli;
mod config;
mod program;

use anyhow::{Context, Result};
use clap::Parser;

use mandel_engine::device::GpuInit;
use mandel_engine::logging::init_logging;
use mandel_engine::window::Runtime;

use crate::app::MandelbrotApp;
use crate::cli::Args;
use crate::program::MandelbrotProgram;

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.resolve().context("failed to load configuration")?;

    init_logging(config.logging());
    log::info!("starting '{}'", config.window.title);

    let vertex = config.shaders.vertex_path();
    let fragment = config.shaders.fragment_path();
    let program = MandelbrotProgram::load(&vertex, &fragment)
        .with_context(|| format!("failed to load shaders from {}", config.shaders.directory.display()))?;

    let app = MandelbrotApp::new(program, config.interaction(), config.fractal.max_value);

    Runtime::run(config.runtime(), GpuInit::default(), app)
}
