//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ScenecastError, ScenecastResult};

/// File name looked up in the working directory before the user config.
pub const LOCAL_CONFIG_FILE: &str = "scenecast.json";

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// External binaries.
    pub tools: ToolPaths,

    /// Where the renderer writes per-scene videos.
    pub media: MediaConfig,

    /// Scene-description source handed to the renderer.
    pub scene_file: PathBuf,

    /// Combined output video.
    pub output_path: PathBuf,

    /// Allowed gap between the combined duration and the sum of its inputs.
    pub duration_tolerance_secs: f64,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// External tool binaries (names on PATH or absolute paths).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub renderer: String,
    pub ffmpeg: String,
    pub ffprobe: String,
}

/// Renderer output layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Root of the renderer's video output (e.g. `media/videos`).
    pub media_root: PathBuf,

    /// Directory the renderer names after the scene source file.
    pub renderer_name: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "scenecast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            media: MediaConfig::default(),
            scene_file: PathBuf::from("manim_flow_maps.py"),
            output_path: PathBuf::from("static/videos/flow_maps_method.mp4"),
            duration_tolerance_secs: 0.5,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            renderer: "manim".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media/videos"),
            renderer_name: "manim_flow_maps".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// A loaded config together with the problems hit while looking for it.
///
/// Warnings are collected rather than logged so callers can emit them once
/// logging is initialized.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,

    /// File the config came from; `None` means defaults.
    pub source: Option<PathBuf>,

    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Emit the collected warnings through `tracing`.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!("{warning}");
        }
    }
}

impl AppConfig {
    /// Load config.
    ///
    /// An explicit path must exist and parse. Otherwise `./scenecast.json`
    /// and then the user config file are tried, falling back to defaults
    /// with a warning when either is unreadable.
    pub fn load(explicit: Option<&Path>) -> ScenecastResult<LoadedConfig> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ScenecastError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            return Ok(LoadedConfig {
                config: Self::from_file(path)?,
                source: Some(path.to_path_buf()),
                warnings: Vec::new(),
            });
        }

        Ok(Self::load_first_valid(&[
            PathBuf::from(LOCAL_CONFIG_FILE),
            config_file_path(),
        ]))
    }

    /// Load the first candidate that exists and parses, skipping unreadable
    /// ones with a warning. Defaults when none qualify.
    pub fn load_first_valid(candidates: &[PathBuf]) -> LoadedConfig {
        let mut warnings = Vec::new();
        for candidate in candidates {
            if !candidate.exists() {
                continue;
            }
            match Self::from_file(candidate) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(candidate.clone()),
                        warnings,
                    };
                }
                Err(e) => warnings.push(format!(
                    "Ignoring config at {}: {e}",
                    candidate.display()
                )),
            }
        }
        if !warnings.is_empty() {
            warnings.push("Falling back to default configuration".to_string());
        }
        LoadedConfig {
            config: Self::default(),
            source: None,
            warnings,
        }
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> ScenecastResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ScenecastError::config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Save config to the given location.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard user config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("scenecast").join("config.json")
}
