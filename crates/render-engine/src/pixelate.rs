//! Nearest-neighbor pixelation.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbaImage;
use pixelpose_common::{PixelposeError, PixelposeResult};

/// Downsample by `block` with nearest-neighbor, then upsample back to the
/// original size. `block == 1` returns the image unchanged.
pub fn pixelate(image: &RgbaImage, block: u32) -> PixelposeResult<RgbaImage> {
    if block == 0 {
        return Err(PixelposeError::config("Pixel size must be at least 1"));
    }
    if block == 1 {
        return Ok(image.clone());
    }

    let (width, height) = image.dimensions();
    let small = imageops::resize(
        image,
        (width / block).max(1),
        (height / block).max(1),
        FilterType::Nearest,
    );
    Ok(imageops::resize(&small, width, height, FilterType::Nearest))
}

/// Pixelate every `*.png` in `frames_dir` into `<output_dir>/pixels`.
///
/// Returns the pixels directory.
pub fn pixelate_frames(
    frames_dir: &Path,
    output_dir: &Path,
    block: u32,
) -> PixelposeResult<PathBuf> {
    if block == 0 {
        return Err(PixelposeError::config("Pixel size must be at least 1"));
    }

    let pixels_dir = output_dir.join("pixels");
    std::fs::create_dir_all(&pixels_dir)?;

    let mut frames = std::fs::read_dir(frames_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .collect::<Vec<_>>();
    frames.sort();

    for frame in &frames {
        let image = image::open(frame)?.to_rgba8();
        let pixelated = pixelate(&image, block)?;
        let name = frame
            .file_stem()
            .map(|stem| format!("{}.png", stem.to_string_lossy()))
            .ok_or_else(|| PixelposeError::render(format!("Bad frame path {}", frame.display())))?;
        pixelated.save(pixels_dir.join(name))?;
    }

    tracing::debug!(
        frames = frames.len(),
        block,
        dir = %pixels_dir.display(),
        "Frames pixelated"
    );
    Ok(pixels_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn test_block_one_is_identity() {
        let image = gradient(33, 17);
        let out = pixelate(&image, 1).unwrap();
        assert_eq!(out.as_raw(), image.as_raw());
    }

    #[test]
    fn test_block_four_gives_uniform_blocks() {
        let image = gradient(128, 128);
        let out = pixelate(&image, 4).unwrap();
        assert_eq!(out.dimensions(), (128, 128));
        for by in 0..32 {
            for bx in 0..32 {
                let first = out.get_pixel(bx * 4, by * 4);
                for dy in 0..4 {
                    for dx in 0..4 {
                        assert_eq!(out.get_pixel(bx * 4 + dx, by * 4 + dy), first);
                    }
                }
            }
        }
    }

    #[test]
    fn test_block_larger_than_image() {
        let image = gradient(3, 5);
        let out = pixelate(&image, 16).unwrap();
        assert_eq!(out.dimensions(), (3, 5));
        let first = *out.get_pixel(0, 0);
        assert!(out.pixels().all(|p| *p == first));
    }

    #[test]
    fn test_zero_block_is_config_error() {
        let err = pixelate(&gradient(4, 4), 0).unwrap_err();
        assert!(matches!(err, PixelposeError::Config { .. }));
    }

    #[test]
    fn test_pixelate_frames_writes_pixels_dir() {
        let dir = std::env::temp_dir().join("pixelpose_test_pixelate_frames");
        let _ = std::fs::remove_dir_all(&dir);
        let frames = dir.join("frames");
        std::fs::create_dir_all(&frames).unwrap();
        gradient(16, 16).save(frames.join("0001.png")).unwrap();
        gradient(16, 16).save(frames.join("0005.png")).unwrap();
        std::fs::write(frames.join("notes.txt"), "skip me").unwrap();

        let pixels = pixelate_frames(&frames, &dir, 4).unwrap();
        assert_eq!(pixels, dir.join("pixels"));
        assert!(pixels.join("0001.png").is_file());
        assert!(pixels.join("0005.png").is_file());
        assert!(!pixels.join("notes.png").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    proptest! {
        #[test]
        fn prop_pixelate_preserves_dimensions(w in 1u32..48, h in 1u32..48, block in 1u32..10) {
            let out = pixelate(&gradient(w, h), block).unwrap();
            prop_assert_eq!(out.dimensions(), (w, h));
        }
    }
}
