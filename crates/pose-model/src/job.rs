//! Render jobs and their results.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One `(source motion, target character)` combination to render.
///
/// Immutable once enumerated. Identity is the `(source, target)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderJob {
    /// Animated source rig.
    pub source_path: PathBuf,

    /// Character rig the animation is applied to.
    pub target_path: PathBuf,

    /// Job output directory (`<root>/<target>/<source>`).
    pub output_dir: PathBuf,

    /// Square output resolution in pixels.
    pub resolution: u32,

    /// Output frame rate.
    pub fps: u32,

    /// Pixelation block size.
    pub pixel_size: u32,
}

impl RenderJob {
    /// The `(source, target)` identity of this job.
    pub fn key(&self) -> (&Path, &Path) {
        (&self.source_path, &self.target_path)
    }

    /// Source file name (`walk.fbx`).
    pub fn source_name(&self) -> String {
        file_name(&self.source_path)
    }

    /// Target file name (`knight.fbx`).
    pub fn target_name(&self) -> String {
        file_name(&self.target_path)
    }

    /// Rasterized frames: `frames/NNNN.png`.
    pub fn frames_dir(&self) -> PathBuf {
        self.output_dir.join("frames")
    }

    /// Persisted pose sequence.
    pub fn poses_path(&self) -> PathBuf {
        self.output_dir.join("poses.json")
    }

    /// Sprite-sheet plan handed to the rasterizer.
    pub fn plan_path(&self) -> PathBuf {
        self.output_dir.join("render_plan.json")
    }

    /// Root passed to the stick-figure renderer (images land in `poses/poses`).
    pub fn stick_root(&self) -> PathBuf {
        self.output_dir.join("poses")
    }

    /// Root passed to the pixelation pass (images land in `pixels`).
    pub fn pixels_root(&self) -> PathBuf {
        self.output_dir.clone()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Outcome of one job. Produced exactly once per job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderJobResult {
    /// The originating job.
    pub job: RenderJob,

    /// Frames produced (or estimated, in count-only mode).
    pub frames_rendered: u64,

    /// Whether the job failed.
    pub error: bool,

    /// Human-readable failure description (empty on success).
    pub error_message: String,
}

impl RenderJobResult {
    pub fn success(job: RenderJob, frames_rendered: u64) -> Self {
        Self {
            job,
            frames_rendered,
            error: false,
            error_message: String::new(),
        }
    }

    /// A failed job. Failed jobs contribute no frames to batch totals.
    pub fn failure(job: RenderJob, frames_rendered: u64, message: impl Into<String>) -> Self {
        Self {
            job,
            frames_rendered,
            error: true,
            error_message: message.into(),
        }
    }
}
