//! Sprite-sheet planning: retarget every sampled frame, frame the whole
//! motion with one camera, and record what the rasterizer needs.

use glam::DVec3;
use pixelpose_common::{FramingConfig, PixelposeError, PixelposeResult};
use pixelpose_pose_model::{JointMap, PoseFrame, PoseSequence, Resolution, RigDocument};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bounds::{BoundingBox, BoundsAccumulator, GlobalBoundingBox};
use crate::camera::CameraFrame;
use crate::estimate::frame_step;
use crate::retarget::JointMapping;
use crate::skeleton::Skeleton;

/// One frame the rasterizer has to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedFrame {
    /// Source frame index.
    pub frame: i64,

    /// Camera position for this frame.
    pub camera_position: DVec3,

    /// Local bases written to the target's matched joints.
    pub keyframe: JointMap,

    /// World-space snapshot of every target joint.
    pub pose: PoseFrame,
}

/// Everything needed to rasterize one job. Serialized as `render_plan.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheetPlan {
    /// Source rig name.
    pub source: String,

    /// Target rig name.
    pub target: String,

    /// Output frame rate.
    pub fps: u32,

    /// Source frames advanced per output frame.
    pub frame_step: u64,

    pub camera: CameraFrame,

    pub bounds: GlobalBoundingBox,

    /// Frames in ascending order.
    pub frames: Vec<PlannedFrame>,
}

impl SpriteSheetPlan {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The world snapshots as a pose sequence for `poses.json`.
    pub fn pose_sequence(
        &self,
        source: impl Into<String>,
        target: impl Into<String>,
        resolution: Resolution,
    ) -> PoseSequence {
        PoseSequence {
            source: source.into(),
            target: target.into(),
            resolution,
            frames: self.frames.iter().map(|f| f.pose.clone()).collect(),
        }
    }
}

/// Builds sprite-sheet plans for a fixed framing and output rate.
#[derive(Debug, Clone)]
pub struct SpriteSheetPlanner {
    framing: FramingConfig,
    fps: u32,
}

impl SpriteSheetPlanner {
    pub fn new(framing: FramingConfig, fps: u32) -> Self {
        Self { framing, fps }
    }

    /// Retarget `source`'s animation onto `target` and frame it.
    pub fn plan(
        &self,
        source: &RigDocument,
        target: &RigDocument,
    ) -> PixelposeResult<SpriteSheetPlan> {
        let clip = source.animation.as_ref().ok_or_else(|| {
            PixelposeError::retarget(format!("Source rig '{}' has no animation", source.name))
        })?;
        if clip.frame_count() == 0 || clip.keys.is_empty() {
            return Err(PixelposeError::retarget(format!(
                "Source rig '{}' has no animation frames",
                source.name
            )));
        }
        if source.joints.is_empty() {
            return Err(PixelposeError::retarget(format!(
                "Source rig '{}' has no skeleton",
                source.name
            )));
        }
        if target.joints.is_empty() && target.bounds.is_none() {
            return Err(PixelposeError::retarget(format!(
                "Target rig '{}' has no skeleton or bounds",
                target.name
            )));
        }

        let source_skeleton = Skeleton::from_rig(source)?;
        let target_skeleton = Skeleton::from_rig(target)?;
        let mapping = JointMapping::by_suffix(&source_skeleton, &target_skeleton);
        let step = frame_step(source.fps, self.fps);

        debug!(
            source = %source.name,
            target = %target.name,
            matched = mapping.matched(),
            target_joints = target_skeleton.len(),
            step,
            "Retargeting"
        );

        let mut basis = target_skeleton.rest_basis();
        let mut accumulator = BoundsAccumulator::new();
        let mut sampled = Vec::new();
        let empty = JointMap::new();

        let mut frame = clip.frame_start;
        while frame <= clip.frame_end {
            let source_pose = clip.key_at(frame).map_or(&empty, |key| &key.pose);
            let keyframe = mapping.transfer(&target_skeleton, source_pose, &mut basis);

            let world = target_skeleton.world_transforms(&basis);
            let frame_box = frame_bounds(target, &target_skeleton, &world)?;
            accumulator.add(&frame_box);

            let root = world
                .first()
                .map(|m| m.translation)
                .unwrap_or_else(|| frame_box.center());
            let mut pose = PoseFrame::new(frame);
            pose.pose = target_skeleton.snapshot(&world);

            sampled.push((frame, keyframe, pose, root));
            frame += step as i64;
        }

        let bounds = accumulator
            .finish()
            .ok_or_else(|| PixelposeError::retarget("No frames were sampled"))?;
        let camera = CameraFrame::fit(&bounds, &self.framing);

        let frames = sampled
            .into_iter()
            .map(|(frame, keyframe, pose, root)| PlannedFrame {
                frame,
                camera_position: camera.track(root),
                keyframe,
                pose,
            })
            .collect::<Vec<_>>();

        debug!(
            frames = frames.len(),
            ortho_scale = camera.ortho_scale,
            "Sprite sheet planned"
        );

        Ok(SpriteSheetPlan {
            source: source.name.clone(),
            target: target.name.clone(),
            fps: self.fps,
            frame_step: step,
            camera,
            bounds,
            frames,
        })
    }
}

/// World box for one frame: joint positions, or the rig's object bounds
/// transformed to world space when it has no joints.
fn frame_bounds(
    rig: &RigDocument,
    skeleton: &Skeleton,
    world: &[glam::DAffine3],
) -> PixelposeResult<BoundingBox> {
    if let Some(bbox) = BoundingBox::from_points(world.iter().map(|m| m.translation)) {
        return Ok(bbox);
    }
    let armature = skeleton.armature_world();
    rig.bounds
        .and_then(|b| {
            BoundingBox::from_points(
                b.corners()
                    .into_iter()
                    .map(|c| armature.transform_point3(DVec3::from_array(c))),
            )
        })
        .ok_or_else(|| {
            PixelposeError::retarget(format!("Rig '{}' has no joints or bounds", rig.name))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelpose_pose_model::{AnimationClip, AnimationKey, JointTransform, RigBounds, RigJoint};

    fn walker(frames: i64) -> RigDocument {
        let keys = (1..=frames)
            .map(|f| {
                let mut pose = JointMap::new();
                pose.insert(
                    "src:Hips".into(),
                    JointTransform::from_location(0.0, f as f64 * 0.1, 0.0),
                );
                AnimationKey { frame: f, pose }
            })
            .collect();
        RigDocument {
            name: "walk".into(),
            fps: 30.0,
            world: JointTransform::IDENTITY,
            joints: vec![
                RigJoint {
                    name: "src:Hips".into(),
                    parent: None,
                    rest: JointTransform::from_location(0.0, 0.0, 1.0),
                },
                RigJoint {
                    name: "src:Head".into(),
                    parent: Some("src:Hips".into()),
                    rest: JointTransform::from_location(0.0, 0.0, 0.7),
                },
            ],
            bounds: None,
            animation: Some(AnimationClip {
                frame_start: 1,
                frame_end: frames,
                keys,
            }),
        }
    }

    fn knight() -> RigDocument {
        RigDocument {
            name: "knight".into(),
            fps: 30.0,
            world: JointTransform::IDENTITY,
            joints: vec![
                RigJoint {
                    name: "mixamorig1:Hips".into(),
                    parent: None,
                    rest: JointTransform::from_location(0.0, 0.0, 1.0),
                },
                RigJoint {
                    name: "mixamorig1:Head".into(),
                    parent: Some("mixamorig1:Hips".into()),
                    rest: JointTransform::from_location(0.0, 0.0, 0.8),
                },
            ],
            bounds: None,
            animation: None,
        }
    }

    #[test]
    fn test_samples_at_frame_step() {
        let plan = SpriteSheetPlanner::new(FramingConfig::default(), 8)
            .plan(&walker(30), &knight())
            .unwrap();
        assert_eq!(plan.frame_step, 4);
        let indices: Vec<i64> = plan.frames.iter().map(|f| f.frame).collect();
        assert_eq!(indices, vec![1, 5, 9, 13, 17, 21, 25, 29]);
    }

    #[test]
    fn test_camera_follows_root_with_fixed_scale() {
        let plan = SpriteSheetPlanner::new(FramingConfig::default(), 8)
            .plan(&walker(30), &knight())
            .unwrap();
        let first = plan.frames.first().unwrap();
        let last = plan.frames.last().unwrap();
        assert!((first.camera_position.y - 0.1).abs() < 1e-9);
        assert!((last.camera_position.y - 2.9).abs() < 1e-9);
        assert_eq!(first.camera_position.x, last.camera_position.x);
        assert_eq!(first.camera_position.z, last.camera_position.z);
    }

    #[test]
    fn test_snapshots_use_target_names_and_rest() {
        let plan = SpriteSheetPlanner::new(FramingConfig::default(), 30)
            .plan(&walker(2), &knight())
            .unwrap();
        let pose = &plan.frames[0].pose.pose;
        let head = pose["mixamorig1:Head"].location;
        assert!((head[1] - 0.1).abs() < 1e-9);
        assert!((head[2] - 1.8).abs() < 1e-9);
        let keyframe = &plan.frames[0].keyframe;
        assert_eq!(keyframe["mixamorig1:Hips"].location, [0.0, 0.1, 0.0]);
        assert_eq!(keyframe["mixamorig1:Head"], JointTransform::IDENTITY);
    }

    #[test]
    fn test_missing_animation_is_retarget_error() {
        let mut source = walker(4);
        source.animation = None;
        let err = SpriteSheetPlanner::new(FramingConfig::default(), 8)
            .plan(&source, &knight())
            .unwrap_err();
        assert!(matches!(err, PixelposeError::Retarget { .. }));
    }

    #[test]
    fn test_empty_target_is_retarget_error() {
        let mut target = knight();
        target.joints.clear();
        assert!(SpriteSheetPlanner::new(FramingConfig::default(), 8)
            .plan(&walker(4), &target)
            .is_err());
    }

    #[test]
    fn test_jointless_target_frames_on_bounds() {
        let mut target = knight();
        target.joints.clear();
        target.bounds = Some(RigBounds {
            min: [-0.5, -0.5, 0.0],
            max: [0.5, 0.5, 2.0],
        });
        let plan = SpriteSheetPlanner::new(FramingConfig::default(), 8)
            .plan(&walker(8), &target)
            .unwrap();
        assert_eq!(plan.len(), 2);
        assert!((plan.camera.ortho_scale - 2.2).abs() < 1e-9);
        assert!(plan.frames[0].pose.pose.is_empty());
    }

    #[test]
    fn test_plan_serializes() {
        let plan = SpriteSheetPlanner::new(FramingConfig::default(), 8)
            .plan(&walker(8), &knight())
            .unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        let back: SpriteSheetPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back.frames.len(), plan.frames.len());
    }
}
