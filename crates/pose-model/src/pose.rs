//! Pose sequences: per-frame world-space joint snapshots (`poses.json`).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::joint::JointTransform;
use crate::PoseModelError;

/// Joint name → transform for one frame.
pub type JointMap = BTreeMap<String, JointTransform>;

/// One animation frame's world-space joint snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Source frame index this snapshot was sampled at.
    pub frame: i64,

    /// Joint name → world transform.
    pub pose: JointMap,
}

impl PoseFrame {
    pub fn new(frame: i64) -> Self {
        Self {
            frame,
            pose: JointMap::new(),
        }
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with_joint(mut self, name: impl Into<String>, transform: JointTransform) -> Self {
        self.pose.insert(name.into(), transform);
        self
    }
}

/// Output image dimensions recorded alongside a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }
}

/// The full record of one job's animation, ordered by frame index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSequence {
    /// Source motion file name.
    pub source: String,

    /// Target character file name.
    pub target: String,

    /// Output resolution of the rendered frames.
    pub resolution: Resolution,

    /// Frames in ascending frame order.
    #[serde(default)]
    pub frames: Vec<PoseFrame>,
}

impl PoseSequence {
    pub fn new(source: impl Into<String>, target: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            resolution,
            frames: vec![],
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PoseModelError> {
        let mut sequence: PoseSequence = crate::read_json(path.as_ref())?;
        sequence.frames.sort_by_key(|f| f.frame);
        Ok(sequence)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PoseModelError> {
        crate::write_json(path.as_ref(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sequence_is_empty() {
        let seq = PoseSequence::new("walk.fbx", "knight.fbx", Resolution::square(128));
        assert!(seq.frames.is_empty());
        assert_eq!(seq.resolution, Resolution { width: 128, height: 128 });
    }

    #[test]
    fn test_parses_scene_tool_layout() {
        let json = r#"{
            "source": "walk.fbx",
            "target": "knight.fbx",
            "resolution": {"width": 128, "height": 128},
            "frames": [
                {"frame": 5, "pose": {"mixamorig:Hips": {"location": [0, 0, 1], "rotation_quaternion": [1, 0, 0, 0], "scale": [1, 1, 1]}}},
                {"frame": 1, "pose": {}}
            ]
        }"#;
        let dir = std::env::temp_dir().join("pixelpose_test_pose_parse");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("poses.json");
        std::fs::write(&path, json).unwrap();

        let seq = PoseSequence::load(&path).unwrap();
        assert_eq!(seq.resolution, Resolution::square(128));
        assert_eq!(seq.frames[0].frame, 1);
        assert_eq!(seq.frames[1].frame, 5);
        assert_eq!(
            seq.frames[1].pose["mixamorig:Hips"].location,
            [0.0, 0.0, 1.0]
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = PoseSequence::load("/nonexistent/pixelpose/poses.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pixelpose/poses.json"));
    }
}
