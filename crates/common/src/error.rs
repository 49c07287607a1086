//! Error types shared across scenecast crates.

use std::path::PathBuf;

/// Top-level error type for scenecast operations.
#[derive(Debug, thiserror::Error)]
pub enum ScenecastError {
    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Render of scene {scene} failed (status {status})")]
    RenderFailed { scene: String, status: String },

    #[error("Probe error: {message}")]
    Probe { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("{} expected input file(s) missing: {}", .paths.len(), display_paths(.paths))]
    MissingInputs { paths: Vec<PathBuf> },

    #[error("{program} exited with status {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Tool not available: {program}")]
    ToolUnavailable { program: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ScenecastError.
pub type ScenecastResult<T> = Result<T, ScenecastError>;

impl ScenecastError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
        }
    }

    pub fn tool_unavailable(program: impl Into<String>) -> Self {
        Self::ToolUnavailable {
            program: program.into(),
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
