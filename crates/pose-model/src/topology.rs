//! Canonical humanoid skeleton topology and body-part color table.
//!
//! Joint names look like `mixamorig:LeftForeArm`. Matching is done on the
//! suffix after the last `:` so differently prefixed rigs line up.

use serde::{Deserialize, Serialize};

/// Body-part category used to pick drawing colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    LeftLeg,
    RightLeg,
    LeftArm,
    RightArm,
    Torso,
    Head,
}

impl BodyPart {
    /// Saturated color used for bones.
    pub fn bone_color(self) -> [u8; 3] {
        match self {
            BodyPart::LeftLeg => [255, 0, 0],
            BodyPart::RightLeg => [0, 255, 0],
            BodyPart::LeftArm => [0, 0, 255],
            BodyPart::RightArm => [255, 255, 0],
            BodyPart::Torso => [255, 0, 255],
            BodyPart::Head => [0, 255, 255],
        }
    }

    /// Lighter tint used for joint markers so they stand out against bones.
    pub fn joint_color(self) -> [u8; 3] {
        match self {
            BodyPart::LeftLeg => [255, 128, 128],
            BodyPart::RightLeg => [128, 255, 128],
            BodyPart::LeftArm => [128, 128, 255],
            BodyPart::RightArm => [255, 255, 128],
            BodyPart::Torso => [255, 128, 255],
            BodyPart::Head => [128, 255, 255],
        }
    }
}

/// Static description of which joints exist, how they connect, and how
/// they are colored.
#[derive(Debug, Clone, Copy)]
pub struct SkeletonTopology {
    /// Canonical joint suffixes.
    pub joints: &'static [&'static str],

    /// `(child, parent)` suffix pairs.
    pub bones: &'static [(&'static str, &'static str)],

    /// Suffix → body part.
    pub parts: &'static [(&'static str, BodyPart)],

    /// Suffix of the joint the projection centers on.
    pub hip: &'static str,
}

/// The humanoid topology used by Mixamo-style rigs.
pub static HUMANOID: SkeletonTopology = SkeletonTopology {
    joints: &[
        "Hips",
        "Spine",
        "Spine1",
        "Spine2",
        "Neck",
        "Head",
        "LeftShoulder",
        "LeftArm",
        "LeftForeArm",
        "LeftHand",
        "LeftUpLeg",
        "LeftLeg",
        "LeftFoot",
        "LeftToeBase",
        "RightShoulder",
        "RightArm",
        "RightForeArm",
        "RightHand",
        "RightUpLeg",
        "RightLeg",
        "RightFoot",
        "RightToeBase",
    ],
    bones: &[
        ("Spine", "Hips"),
        ("Spine1", "Spine"),
        ("Spine2", "Spine1"),
        ("Neck", "Spine2"),
        ("Head", "Neck"),
        ("LeftShoulder", "Spine2"),
        ("LeftArm", "LeftShoulder"),
        ("LeftForeArm", "LeftArm"),
        ("LeftHand", "LeftForeArm"),
        ("RightShoulder", "Spine2"),
        ("RightArm", "RightShoulder"),
        ("RightForeArm", "RightArm"),
        ("RightHand", "RightForeArm"),
        ("LeftUpLeg", "Hips"),
        ("LeftLeg", "LeftUpLeg"),
        ("LeftFoot", "LeftLeg"),
        ("LeftToeBase", "LeftFoot"),
        ("RightUpLeg", "Hips"),
        ("RightLeg", "RightUpLeg"),
        ("RightFoot", "RightLeg"),
        ("RightToeBase", "RightFoot"),
    ],
    parts: &[
        ("LeftUpLeg", BodyPart::LeftLeg),
        ("LeftLeg", BodyPart::LeftLeg),
        ("LeftFoot", BodyPart::LeftLeg),
        ("LeftToeBase", BodyPart::LeftLeg),
        ("RightUpLeg", BodyPart::RightLeg),
        ("RightLeg", BodyPart::RightLeg),
        ("RightFoot", BodyPart::RightLeg),
        ("RightToeBase", BodyPart::RightLeg),
        ("LeftShoulder", BodyPart::LeftArm),
        ("LeftArm", BodyPart::LeftArm),
        ("LeftForeArm", BodyPart::LeftArm),
        ("LeftHand", BodyPart::LeftArm),
        ("RightShoulder", BodyPart::RightArm),
        ("RightArm", BodyPart::RightArm),
        ("RightForeArm", BodyPart::RightArm),
        ("RightHand", BodyPart::RightArm),
        ("Hips", BodyPart::Torso),
        ("Spine", BodyPart::Torso),
        ("Spine1", BodyPart::Torso),
        ("Spine2", BodyPart::Torso),
        ("Neck", BodyPart::Head),
        ("Head", BodyPart::Head),
    ],
    hip: "Hips",
};

impl SkeletonTopology {
    /// The canonical suffix this joint name maps to, if any.
    ///
    /// Accepts both prefixed (`rig:Hips`) and bare (`Hips`) names.
    pub fn canonical_suffix(&self, joint_name: &str) -> Option<&'static str> {
        let suffix = joint_suffix(joint_name);
        self.joints.iter().copied().find(|s| *s == suffix)
    }

    /// Body part for a suffix. Unknown suffixes count as torso.
    pub fn body_part(&self, suffix: &str) -> BodyPart {
        self.parts
            .iter()
            .find(|(s, _)| *s == suffix)
            .map(|(_, part)| *part)
            .unwrap_or(BodyPart::Torso)
    }
}

/// Everything after the last `:` (or the whole name when there is none).
pub fn joint_suffix(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, s)| s).unwrap_or(name)
}
