//! Output frame counts and sampling steps.

/// Number of frames a job produces when resampling `total_frames` recorded
/// at `native_fps` to `target_fps`.
///
/// Returns 0 for an empty clip or a non-positive rate. Zero is a valid
/// answer here; callers decide whether it is an error.
pub fn estimate_frame_count(total_frames: u64, native_fps: f64, target_fps: u32) -> u64 {
    if total_frames == 0 || !(native_fps.is_finite() && native_fps > 0.0) || target_fps == 0 {
        return 0;
    }
    let frames = total_frames as f64 / native_fps * target_fps as f64;
    frames.round().max(0.0) as u64
}

/// Source frames advanced per output frame: `max(1, round(native / target))`.
pub fn frame_step(native_fps: f64, target_fps: u32) -> u64 {
    if target_fps == 0 || !(native_fps.is_finite() && native_fps > 0.0) {
        return 1;
    }
    (native_fps / target_fps as f64).round().max(1.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_rounds() {
        // 60 frames at 30fps = 2s; at 8fps = 16 frames.
        assert_eq!(estimate_frame_count(60, 30.0, 8), 16);
        // 31 / 30 * 8 = 8.27 -> 8
        assert_eq!(estimate_frame_count(31, 30.0, 8), 8);
        // 2 / 30 * 8 = 0.53 -> 1
        assert_eq!(estimate_frame_count(2, 30.0, 8), 1);
    }

    #[test]
    fn test_estimate_zero_cases() {
        assert_eq!(estimate_frame_count(0, 30.0, 8), 0);
        assert_eq!(estimate_frame_count(1, 30.0, 8), 0);
        assert_eq!(estimate_frame_count(60, 0.0, 8), 0);
        assert_eq!(estimate_frame_count(60, 30.0, 0), 0);
    }

    #[test]
    fn test_frame_step() {
        assert_eq!(frame_step(30.0, 8), 4);
        assert_eq!(frame_step(30.0, 12), 3);
        assert_eq!(frame_step(24.0, 60), 1);
        assert_eq!(frame_step(30.0, 0), 1);
    }
}
