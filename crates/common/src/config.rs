//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PixelposeError, PixelposeResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default batch settings.
    pub batch: BatchDefaults,

    /// External scene tool invocation.
    pub scene_tool: SceneToolConfig,

    /// Sprite-sheet camera framing parameters.
    pub framing: FramingConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default batch parameters, overridable from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchDefaults {
    /// Root directory for rendered jobs.
    pub output_dir: PathBuf,

    /// Square output resolution in pixels.
    pub resolution: u32,

    /// Output frame rate.
    pub fps: u32,

    /// Pixelation block size.
    pub pixel_size: u32,

    /// Number of workers.
    pub workers: usize,

    /// Asset file extension (without the dot).
    pub extension: String,

    /// Quarantine directory for sources that fail jobs.
    pub purge_dir: PathBuf,
}

/// How to launch the external scene tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneToolConfig {
    /// Program followed by its leading arguments. Operation arguments
    /// (`count`, `export-rig`, `render`) are appended after these.
    pub command: Vec<String>,
}

/// Camera framing parameters for the sprite-sheet pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Multiplier applied to the character size to get the ortho scale.
    pub padding_factor: f64,

    /// Extra padding in output pixels.
    pub render_padding_px: u32,

    /// World units per output pixel used to convert `render_padding_px`.
    pub world_units_per_pixel: f64,

    /// Camera distance from the bounding-box center along the view axis.
    pub camera_distance: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "pixelpose=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for BatchDefaults {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dataset"),
            resolution: 128,
            fps: 8,
            pixel_size: 4,
            workers: 1,
            extension: "fbx".to_string(),
            purge_dir: PathBuf::from("purged"),
        }
    }
}

impl Default for SceneToolConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "blender".to_string(),
                "--background".to_string(),
                "--python".to_string(),
                "scene_tool.py".to_string(),
                "--".to_string(),
            ],
        }
    }
}

impl SceneToolConfig {
    /// Split the command into program and leading arguments.
    pub fn program(&self) -> PixelposeResult<(&str, &[String])> {
        match self.command.split_first() {
            Some((program, args)) if !program.trim().is_empty() => Ok((program.as_str(), args)),
            _ => Err(PixelposeError::config("Scene tool command is empty")),
        }
    }

    /// Script handed to the tool with `--python`, if the command runs one.
    pub fn script(&self) -> Option<&Path> {
        self.command
            .windows(2)
            .find(|pair| pair[0] == "--python")
            .map(|pair| Path::new(&pair[1]))
    }
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            padding_factor: 1.1,
            render_padding_px: 0,
            world_units_per_pixel: 0.01,
            camera_distance: 10.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("pixelpose").join("config.json")
}
