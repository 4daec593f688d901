//! Asset discovery and job enumeration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pixelpose_common::{PixelposeError, PixelposeResult};
use pixelpose_pose_model::RenderJob;
use serde::{Deserialize, Serialize};

/// Settings shared by every job of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSettings {
    /// Root directory for job outputs.
    pub output_root: PathBuf,

    /// Square output resolution in pixels.
    pub resolution: u32,

    /// Output frame rate.
    pub fps: u32,

    /// Pixelation block size.
    pub pixel_size: u32,

    /// Asset extension, without the dot. Matched case-insensitively.
    pub extension: String,
}

impl JobSettings {
    pub fn validate(&self) -> PixelposeResult<()> {
        if self.resolution == 0 {
            return Err(PixelposeError::config("Resolution must be at least 1"));
        }
        if self.fps == 0 {
            return Err(PixelposeError::config("Frame rate must be at least 1"));
        }
        if self.pixel_size == 0 {
            return Err(PixelposeError::config("Pixel size must be at least 1"));
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(PixelposeError::config("Asset extension is empty"));
        }
        Ok(())
    }
}

/// Files in `dir` (not recursive) with the given extension, sorted by name.
pub fn discover_assets(dir: &Path, extension: &str) -> PixelposeResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PixelposeError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    let extension = extension.trim_start_matches('.');

    let mut assets = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect::<Vec<_>>();
    assets.sort();
    Ok(assets)
}

/// One job per `(target, source)` pair, output under
/// `<output_root>/<target stem>/<source stem>`.
///
/// Both directories must exist, and no two assets in one directory may
/// share a stem (`walk.fbx` and `walk.FBX` would write the same output
/// directory). The output root is created if needed.
pub fn enumerate_jobs(
    source_dir: &Path,
    target_dir: &Path,
    settings: &JobSettings,
) -> PixelposeResult<Vec<RenderJob>> {
    settings.validate()?;
    let sources = discover_assets(source_dir, &settings.extension)?;
    let targets = discover_assets(target_dir, &settings.extension)?;
    ensure_unique_stems(&sources, source_dir)?;
    ensure_unique_stems(&targets, target_dir)?;

    std::fs::create_dir_all(&settings.output_root).map_err(|e| {
        PixelposeError::setup(format!(
            "Cannot create output directory {}: {e}",
            settings.output_root.display()
        ))
    })?;

    let mut jobs = Vec::with_capacity(sources.len() * targets.len());
    for target in &targets {
        for source in &sources {
            jobs.push(RenderJob {
                source_path: source.clone(),
                target_path: target.clone(),
                output_dir: settings.output_root.join(stem(target)).join(stem(source)),
                resolution: settings.resolution,
                fps: settings.fps,
                pixel_size: settings.pixel_size,
            });
        }
    }

    tracing::info!(
        sources = sources.len(),
        targets = targets.len(),
        jobs = jobs.len(),
        "Jobs enumerated"
    );
    Ok(jobs)
}

fn ensure_unique_stems(assets: &[PathBuf], dir: &Path) -> PixelposeResult<()> {
    let mut seen = HashMap::new();
    for asset in assets {
        if let Some(other) = seen.insert(stem(asset), asset) {
            return Err(PixelposeError::setup(format!(
                "{} and {} in {} map to the same output directory",
                other.display(),
                asset.display(),
                dir.display()
            )));
        }
    }
    Ok(())
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
