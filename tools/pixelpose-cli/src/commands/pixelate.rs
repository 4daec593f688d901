//! Pixelate a directory of frames.

use std::path::PathBuf;

use pixelpose_render_engine::pixelate_frames;

pub fn run(frames_dir: PathBuf, output: Option<PathBuf>, pixel_size: u32) -> anyhow::Result<()> {
    if !frames_dir.is_dir() {
        anyhow::bail!("Frames directory not found: {}", frames_dir.display());
    }
    let output = output.unwrap_or_else(|| {
        frames_dir
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let dir = pixelate_frames(&frames_dir, &output, pixel_size)?;
    println!("Pixelated frames written to {}", dir.display());
    Ok(())
}
