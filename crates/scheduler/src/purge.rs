//! Quarantine of sources that failed a job.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use pixelpose_common::{PixelposeError, PixelposeResult};
use pixelpose_pose_model::RenderJobResult;

/// Copy each failing job's source into `purge_dir`, then delete the
/// original. A source that failed several jobs is moved once.
///
/// An existing file of the same name in `purge_dir` is never overwritten;
/// the copy gets a numbered name (`idle.1.fbx`) instead. The original is
/// only removed after its copy succeeded. Per-file I/O failures are logged
/// and skipped. Returns the number of sources removed from their original
/// location.
pub fn purge_failed_sources(
    results: &[RenderJobResult],
    purge_dir: &Path,
) -> PixelposeResult<usize> {
    std::fs::create_dir_all(purge_dir).map_err(|e| {
        PixelposeError::setup(format!(
            "Cannot create purge directory {}: {e}",
            purge_dir.display()
        ))
    })?;

    let mut seen = HashSet::new();
    let mut moved = 0;

    for result in results.iter().filter(|r| r.error) {
        let source = &result.job.source_path;
        if !seen.insert(source.clone()) {
            continue;
        }
        if !source.exists() {
            tracing::warn!(source = %source.display(), "Failing source no longer exists, not purged");
            continue;
        }
        let Some(destination) = quarantine_path(source, purge_dir) else {
            continue;
        };

        if let Err(e) = std::fs::copy(source, &destination) {
            tracing::warn!(
                source = %source.display(),
                error = %e,
                "Failed to copy source to purge directory"
            );
            continue;
        }

        match std::fs::remove_file(source) {
            Ok(()) => {
                tracing::info!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "Purged failing source"
                );
                moved += 1;
            }
            Err(e) => {
                tracing::warn!(
                    source = %source.display(),
                    error = %e,
                    "Failed to remove purged source"
                );
            }
        }
    }

    Ok(moved)
}

/// First free name for `source` inside `purge_dir`: `idle.fbx`, then
/// `idle.1.fbx`, `idle.2.fbx`, ...
fn quarantine_path(source: &Path, purge_dir: &Path) -> Option<PathBuf> {
    let name = source.file_name()?;
    let candidate = purge_dir.join(name);
    if !candidate.exists() {
        return Some(candidate);
    }

    let stem = source.file_stem()?.to_string_lossy().into_owned();
    let extension = source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    (1u32..)
        .map(|n| purge_dir.join(format!("{stem}.{n}{extension}")))
        .find(|path| !path.exists())
}
