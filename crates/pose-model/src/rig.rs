//! Rig documents: a skeleton hierarchy plus an optional animation clip,
//! exported from the scene tool as plain JSON.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::joint::JointTransform;
use crate::pose::JointMap;
use crate::PoseModelError;

/// A skeleton and its animation as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigDocument {
    /// Armature name.
    pub name: String,

    /// Native frame rate of the animation clip.
    #[serde(default = "default_fps")]
    pub fps: f64,

    /// Armature object transform in world space.
    #[serde(default)]
    pub world: JointTransform,

    /// Joints, parents before children. The first joint is the root.
    #[serde(default)]
    pub joints: Vec<RigJoint>,

    /// Object-space bounds, used when the rig has no joints.
    #[serde(default)]
    pub bounds: Option<RigBounds>,

    /// Animation clip, if the rig is animated.
    #[serde(default)]
    pub animation: Option<AnimationClip>,
}

fn default_fps() -> f64 {
    30.0
}

/// One joint of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigJoint {
    /// Full joint name (`<prefix>:<suffix>`).
    pub name: String,

    /// Parent joint name; `None` for roots.
    #[serde(default)]
    pub parent: Option<String>,

    /// Rest offset relative to the parent joint.
    #[serde(default)]
    pub rest: JointTransform,
}

/// Axis-aligned object-space bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigBounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl RigBounds {
    /// The eight corners of the box.
    pub fn corners(&self) -> [[f64; 3]; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [a[0], b[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [a[0], b[1], b[2]],
            [b[0], b[1], b[2]],
        ]
    }
}

/// Keyed local joint bases over an inclusive frame range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub frame_start: i64,
    pub frame_end: i64,

    /// Keys in any order; looked up by frame.
    #[serde(default)]
    pub keys: Vec<AnimationKey>,
}

/// Local pose bases for the joints keyed at one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationKey {
    pub frame: i64,
    pub pose: JointMap,
}

impl AnimationClip {
    /// Number of frames in the inclusive range (0 for an inverted range).
    pub fn frame_count(&self) -> u64 {
        if self.frame_end < self.frame_start {
            0
        } else {
            (self.frame_end - self.frame_start + 1) as u64
        }
    }

    /// The most recent key at or before `frame`, or the first key when
    /// `frame` precedes every key.
    pub fn key_at(&self, frame: i64) -> Option<&AnimationKey> {
        self.keys
            .iter()
            .filter(|k| k.frame <= frame)
            .max_by_key(|k| k.frame)
            .or_else(|| self.keys.iter().min_by_key(|k| k.frame))
    }
}

impl RigDocument {
    /// Load and validate a rig document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PoseModelError> {
        let rig: RigDocument = crate::read_json(path.as_ref())?;
        rig.validate()?;
        Ok(rig)
    }

    /// Parse and validate a rig document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PoseModelError> {
        let rig: RigDocument =
            serde_json::from_str(json).map_err(|e| PoseModelError::ParseError {
                path: "<inline>".into(),
                source: e,
            })?;
        rig.validate()?;
        Ok(rig)
    }

    /// Check hierarchy ordering and frame-rate sanity.
    pub fn validate(&self) -> Result<(), PoseModelError> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(PoseModelError::ValidationError {
                message: format!("rig '{}' has invalid fps {}", self.name, self.fps),
            });
        }

        let mut seen = HashSet::new();
        for joint in &self.joints {
            if let Some(parent) = &joint.parent {
                if !seen.contains(parent.as_str()) {
                    return Err(PoseModelError::ValidationError {
                        message: format!(
                            "joint '{}' references parent '{}' before it is defined",
                            joint.name, parent
                        ),
                    });
                }
            }
            if !seen.insert(joint.name.as_str()) {
                return Err(PoseModelError::ValidationError {
                    message: format!("duplicate joint '{}'", joint.name),
                });
            }
        }
        Ok(())
    }

    /// Total animation frames (0 when there is no clip).
    pub fn total_frames(&self) -> u64 {
        self.animation.as_ref().map_or(0, AnimationClip::frame_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RIG: &str = r#"{
        "name": "Armature",
        "fps": 30,
        "joints": [
            {"name": "mixamorig:Hips", "rest": {"location": [0, 0, 1], "rotation_quaternion": [1, 0, 0, 0], "scale": [1, 1, 1]}},
            {"name": "mixamorig:Spine", "parent": "mixamorig:Hips"}
        ],
        "animation": {
            "frame_start": 1,
            "frame_end": 60,
            "keys": [
                {"frame": 1, "pose": {}},
                {"frame": 30, "pose": {"mixamorig:Spine": {"location": [0, 0.1, 0], "rotation_quaternion": [1, 0, 0, 0], "scale": [1, 1, 1]}}}
            ]
        }
    }"#;

    #[test]
    fn test_parse_rig_document() {
        let rig = RigDocument::from_json(RIG).unwrap();
        assert_eq!(rig.joints.len(), 2);
        assert_eq!(rig.joints[0].name, "mixamorig:Hips");
        assert_eq!(rig.total_frames(), 60);
        assert_eq!(rig.world, JointTransform::IDENTITY);
        assert_eq!(rig.joints[1].rest, JointTransform::IDENTITY);
    }

    #[test]
    fn test_key_lookup_holds_previous_key() {
        let rig = RigDocument::from_json(RIG).unwrap();
        let clip = rig.animation.as_ref().unwrap();
        assert_eq!(clip.key_at(1).unwrap().frame, 1);
        assert_eq!(clip.key_at(29).unwrap().frame, 1);
        assert_eq!(clip.key_at(45).unwrap().frame, 30);
        assert_eq!(clip.key_at(-5).unwrap().frame, 1);
    }

    #[test]
    fn test_parent_must_precede_child() {
        let json = r#"{"name": "A", "joints": [{"name": "a:Spine", "parent": "a:Hips"}, {"name": "a:Hips"}]}"#;
        assert!(RigDocument::from_json(json).is_err());
    }

    #[test]
    fn test_inverted_range_has_no_frames() {
        let clip = AnimationClip {
            frame_start: 10,
            frame_end: 1,
            keys: vec![],
        };
        assert_eq!(clip.frame_count(), 0);
    }
}
