//! PixelPose Render Engine
//!
//! Everything a worker does with one job after it has been scheduled:
//! count frames, plan the sprite sheet, hand the plan to the scene tool,
//! then post-process the frames.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source rig ──┐
//!              ├── SpriteSheetPlanner ── render_plan.json
//! target rig ──┘                              │
//!                                             ├── Scene tool ── frames/NNNN.png ── Pixelate ── pixels/NNNN.png
//!                                             │
//!                                             └── poses.json ── Stick figures ── poses/poses/NNNN.png
//! ```

pub mod backend;
pub mod pipeline;
pub mod pixelate;
pub mod stick;

pub use backend::{
    command_exists, FrameCounter, JsonRigSource, RigFrameCounter, RigSource, SceneRenderer,
    SceneToolBackend,
};
pub use pipeline::{JobPipeline, JobProcessor};
pub use pixelate::{pixelate, pixelate_frames};
pub use stick::{render_pose_sequence, render_stick_image, StickFigureRenderer};

/// Image file name for a frame index (`0007.png`).
pub fn frame_file_name(frame: i64) -> String {
    format!("{frame:04}.png")
}
