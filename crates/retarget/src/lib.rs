//! PixelPose Retarget: the sprite-sheet planner
//!
//! Turns a source motion and a target character into a render plan:
//! - **Skeleton:** Forward kinematics over plain joint data
//! - **Retarget:** Copy local joint bases across rigs by name suffix
//! - **Bounds:** Per-frame and global bounding boxes
//! - **Camera:** One fixed orthographic scale plus per-frame root tracking
//! - **Estimate:** Output frame counts and sampling steps
//!
//! This crate is pure computation: no I/O, no scene tool, no images.

pub mod bounds;
pub mod camera;
pub mod estimate;
pub mod retarget;
pub mod sheet;
pub mod skeleton;

pub use bounds::{BoundingBox, BoundsAccumulator, GlobalBoundingBox};
pub use camera::CameraFrame;
pub use estimate::{estimate_frame_count, frame_step};
pub use retarget::JointMapping;
pub use sheet::{PlannedFrame, SpriteSheetPlan, SpriteSheetPlanner};
pub use skeleton::Skeleton;
