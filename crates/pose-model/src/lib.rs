//! PixelPose Pose Model
//!
//! Defines the core data contracts shared by the batch renderer:
//! - **Jobs:** One `(source motion, target character)` pair and its result
//! - **Joints:** World or local transforms (location, rotation, scale)
//! - **Poses:** Per-frame joint snapshots persisted as `poses.json`
//! - **Rigs:** Skeleton hierarchy plus animation clip as plain data
//! - **Topology:** Canonical joint names, bones, and body-part colors
//!
//! Joint names follow the `<armature-prefix>:<suffix>` convention. Only the
//! suffix is meaningful across differently-prefixed skeletons.

pub mod job;
pub mod joint;
pub mod pose;
pub mod rig;
pub mod topology;

pub use job::*;
pub use joint::*;
pub use pose::*;
pub use rig::*;
pub use topology::*;

use std::path::PathBuf;

/// Errors that can occur when reading or writing model documents.
#[derive(Debug, thiserror::Error)]
pub enum PoseModelError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid document: {message}")]
    ValidationError { message: String },
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
) -> Result<T, PoseModelError> {
    let content = std::fs::read_to_string(path).map_err(|e| PoseModelError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| PoseModelError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

pub(crate) fn write_json<T: serde::Serialize>(
    path: &std::path::Path,
    value: &T,
) -> Result<(), PoseModelError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PoseModelError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| PoseModelError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, json).map_err(|e| PoseModelError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}
