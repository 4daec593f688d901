//! Stick-figure rendering for an existing pose sequence.

use std::path::PathBuf;

use anyhow::Context;
use pixelpose_pose_model::PoseSequence;
use pixelpose_render_engine::render_pose_sequence;

pub fn run(
    poses_json: PathBuf,
    output: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
) -> anyhow::Result<()> {
    let sequence = PoseSequence::load(&poses_json)
        .with_context(|| format!("Failed to read {}", poses_json.display()))?;

    let output = output.unwrap_or_else(|| {
        poses_json
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let width = width.unwrap_or(sequence.resolution.width);
    let height = height.unwrap_or(sequence.resolution.height);

    let dir = render_pose_sequence(&poses_json, &output, width, height)?;
    println!(
        "Rendered {} pose images ({}x{}) to {}",
        sequence.frames.len(),
        width,
        height,
        dir.display()
    );
    Ok(())
}
