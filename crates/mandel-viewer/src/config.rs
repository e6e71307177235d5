//! Viewer configuration.
//!
//! Built-in defaults, optionally overlaid by a TOML file, then by CLI flags
//! (see `cli`). Every section is optional in the file; missing keys keep
//! their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use mandel_engine::logging::LoggingConfig;
use mandel_engine::view::{InteractionConfig, WheelZoom};
use mandel_engine::window::{LogicalSize, RuntimeConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ViewerConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub fractal: FractalConfig,
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub shaders: ShaderConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Initial inner width in logical pixels.
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "GLView".to_string(),
            width: 400,
            height: 400,
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalConfig {
    pub start_iteration: u32,
    pub min_iteration: u32,
    /// Escape radius.
    pub max_value: f32,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            start_iteration: 360,
            min_iteration: 1,
            max_value: 2.0,
        }
    }
}

/// Wheel direction that magnifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WheelUp {
    #[default]
    ZoomIn,
    ZoomOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub scale_up_factor: f32,
    pub scale_down_factor: f32,
    pub wheel_up: WheelUp,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            scale_up_factor: 1.1,
            scale_down_factor: 0.9,
            wheel_up: WheelUp::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub directory: PathBuf,
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")),
            vertex: "mandelbrot.vert.wgsl".to_string(),
            fragment: "mandelbrot.frag.wgsl".to_string(),
        }
    }
}

impl ShaderConfig {
    pub fn vertex_path(&self) -> PathBuf {
        self.directory.join(&self.vertex)
    }

    pub fn fragment_path(&self) -> PathBuf {
        self.directory.join(&self.fragment)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// `env_logger` filter; falls back to `RUST_LOG`, then the engine default.
    pub filter: Option<String>,
}

impl ViewerConfig {
    /// Reads and parses a TOML file. The result is not validated yet.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.window;
        if w.width == 0 || w.height == 0 {
            return invalid(format!("window size {}x{} has a zero side", w.width, w.height));
        }
        if w.fps == 0 {
            return invalid("fps must be at least 1");
        }

        let z = &self.zoom;
        if !(z.scale_up_factor.is_finite() && z.scale_up_factor > 1.0) {
            return invalid(format!("scale_up_factor {} must be > 1", z.scale_up_factor));
        }
        if !(z.scale_down_factor > 0.0 && z.scale_down_factor < 1.0) {
            return invalid(format!(
                "scale_down_factor {} must be in (0, 1)",
                z.scale_down_factor
            ));
        }

        let f = &self.fractal;
        if f.min_iteration == 0 {
            return invalid("min_iteration must be at least 1");
        }
        if f.start_iteration < f.min_iteration {
            return invalid(format!(
                "start_iteration {} is below min_iteration {}",
                f.start_iteration, f.min_iteration
            ));
        }
        if !(f.max_value.is_finite() && f.max_value > 0.0) {
            return invalid(format!("max_value {} must be positive", f.max_value));
        }

        Ok(())
    }

    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.window.title.clone(),
            initial_size: LogicalSize::new(self.window.width as f64, self.window.height as f64),
            fps: self.window.fps,
        }
    }

    pub fn interaction(&self) -> InteractionConfig {
        InteractionConfig {
            scale_up_factor: self.zoom.scale_up_factor,
            scale_down_factor: self.zoom.scale_down_factor,
            start_iteration: self.fractal.start_iteration,
            min_iteration: self.fractal.min_iteration,
            wheel_zoom: match self.zoom.wheel_up {
                WheelUp::ZoomIn => WheelZoom::UpZoomsIn,
                WheelUp::ZoomOut => WheelZoom::UpZoomsOut,
            },
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.logging.filter.clone(),
            ..Default::default()
        }
    }
}

fn invalid(msg: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg.into()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_toml(text: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(text.as_bytes()).unwrap();
        f
    }

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn defaults_are_valid() {
        let cfg = ViewerConfig::default();
        cfg.validate().unwrap();

        assert_eq!(cfg.window.title, "GLView");
        assert_eq!((cfg.window.width, cfg.window.height, cfg.window.fps), (400, 400, 60));
        assert_eq!(cfg.fractal.start_iteration, 360);
        assert_eq!(cfg.fractal.max_value, 2.0);
    }

    #[test]
    fn default_shader_paths_exist() {
        let cfg = ShaderConfig::default();
        assert!(cfg.vertex_path().is_file());
        assert!(cfg.fragment_path().is_file());
    }

    // ── load ──────────────────────────────────────────────────────────────

    #[test]
    fn partial_file_keeps_other_defaults() {
        let f = write_toml(
            r#"
            [window]
            width = 800

            [zoom]
            wheel_up = "zoom-out"
            "#,
        );
        let cfg = ViewerConfig::load(f.path()).unwrap();

        assert_eq!(cfg.window.width, 800);
        assert_eq!(cfg.window.height, 400);
        assert_eq!(cfg.zoom.wheel_up, WheelUp::ZoomOut);
        assert_eq!(cfg.zoom.scale_up_factor, 1.1);
        assert_eq!(cfg.interaction().wheel_zoom, WheelZoom::UpZoomsOut);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewerConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let f = write_toml("[window\nwidth = ");
        let err = ViewerConfig::load(f.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_wheel_mode_is_parse_error() {
        let f = write_toml("[zoom]\nwheel_up = \"sideways\"\n");
        assert!(matches!(
            ViewerConfig::load(f.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    // ── validate ──────────────────────────────────────────────────────────

    #[test]
    fn validate_rejects_bad_values() {
        let cases: Vec<Box<dyn Fn(&mut ViewerConfig)>> = vec![
            Box::new(|c| c.window.width = 0),
            Box::new(|c| c.window.fps = 0),
            Box::new(|c| c.zoom.scale_up_factor = 1.0),
            Box::new(|c| c.zoom.scale_down_factor = 1.0),
            Box::new(|c| c.zoom.scale_down_factor = 0.0),
            Box::new(|c| c.fractal.min_iteration = 0),
            Box::new(|c| c.fractal.start_iteration = 0),
            Box::new(|c| c.fractal.max_value = f32::NAN),
            Box::new(|c| c.fractal.max_value = -2.0),
        ];

        for (i, mutate) in cases.iter().enumerate() {
            let mut cfg = ViewerConfig::default();
            mutate(&mut cfg);
            assert!(
                matches!(cfg.validate(), Err(ConfigError::Invalid(_))),
                "case {i} accepted"
            );
        }
    }

    // ── conversions ───────────────────────────────────────────────────────

    #[test]
    fn runtime_and_interaction_follow_config() {
        let mut cfg = ViewerConfig::default();
        cfg.window.fps = 30;
        cfg.fractal.start_iteration = 50;

        let rt = cfg.runtime();
        assert_eq!(rt.fps, 30);
        assert_eq!(rt.initial_size.width, 400.0);

        let ic = cfg.interaction();
        assert_eq!(ic.start_iteration, 50);
        assert_eq!(ic.wheel_zoom, WheelZoom::UpZoomsIn);
    }
}
