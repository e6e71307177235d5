use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ViewerConfig};

#[derive(Debug, Parser)]
#[command(name = "mandel-viewer")]
#[command(
    version,
    about = "Interactive Mandelbrot viewer: drag to pan, wheel to zoom, ctrl+wheel for detail"
)]
pub struct Args {
    /// TOML config file (defaults apply to anything it leaves out)
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Initial window width in logical pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height in logical pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Target frame rate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Directory holding the vertex and fragment shaders
    #[arg(long, value_name = "DIR")]
    pub shader_dir: Option<PathBuf>,

    /// Log filter, env_logger syntax (e.g. "debug" or "mandel_engine=trace")
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

impl Args {
    /// Defaults, then the config file, then flags; validated.
    pub fn resolve(&self) -> Result<ViewerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut ViewerConfig) {
        if let Some(w) = self.width {
            config.window.width = w;
        }
        if let Some(h) = self.height {
            config.window.height = h;
        }
        if let Some(fps) = self.fps {
            config.window.fps = fps;
        }
        if let Some(dir) = &self.shader_dir {
            config.shaders.directory = dir.clone();
        }
        if let Some(filter) = &self.log {
            config.logging.filter = Some(filter.clone());
        }
    }
}
