//! Error types shared across PixelPose crates.

use std::path::PathBuf;

/// Top-level error type for PixelPose operations.
///
/// Everything below the scheduler returns this type. The worker boundary
/// turns it into a failed job result, so only setup errors raised before
/// the first job ever reach the process exit status.
#[derive(Debug, thiserror::Error)]
pub enum PixelposeError {
    #[error("Setup error: {message}")]
    Setup { message: String },

    #[error("Directory not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Frame estimation error: {message}")]
    Estimation { message: String },

    #[error("0 frames to render for {path}")]
    ZeroFrames { path: PathBuf },

    #[error("Retarget error: {message}")]
    Retarget { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PixelposeError.
pub type PixelposeResult<T> = Result<T, PixelposeError>;

impl PixelposeError {
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup {
            message: msg.into(),
        }
    }

    pub fn estimation(msg: impl Into<String>) -> Self {
        Self::Estimation {
            message: msg.into(),
        }
    }

    pub fn retarget(msg: impl Into<String>) -> Self {
        Self::Retarget {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error aborts a whole batch rather than a single job.
    pub fn is_setup_error(&self) -> bool {
        matches!(self, Self::Setup { .. } | Self::NotFound { .. })
    }
}
