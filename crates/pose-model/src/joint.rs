//! Joint transform type shared by rigs, plans, and pose sequences.

use glam::{DAffine3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Location, rotation, and scale of one joint.
///
/// Depending on context this is either a local basis (rig documents, plans)
/// or a world-space snapshot (pose sequences). Rotation is stored in
/// `[w, x, y, z]` order to match the scene tool's export format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointTransform {
    pub location: [f64; 3],
    pub rotation_quaternion: [f64; 4],
    pub scale: [f64; 3],
}

impl JointTransform {
    /// Identity transform (rest basis).
    pub const IDENTITY: JointTransform = JointTransform {
        location: [0.0, 0.0, 0.0],
        rotation_quaternion: [1.0, 0.0, 0.0, 0.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Build from glam components.
    pub fn from_parts(location: DVec3, rotation: DQuat, scale: DVec3) -> Self {
        let rotation = rotation.normalize();
        Self {
            location: location.to_array(),
            rotation_quaternion: [rotation.w, rotation.x, rotation.y, rotation.z],
            scale: scale.to_array(),
        }
    }

    /// Translation-only transform.
    pub fn from_location(x: f64, y: f64, z: f64) -> Self {
        Self {
            location: [x, y, z],
            ..Self::IDENTITY
        }
    }

    pub fn location(&self) -> DVec3 {
        DVec3::from_array(self.location)
    }

    /// Rotation as a unit quaternion. A zero quaternion falls back to identity.
    pub fn rotation(&self) -> DQuat {
        let [w, x, y, z] = self.rotation_quaternion;
        let q = DQuat::from_xyzw(x, y, z, w);
        if q.length_squared() <= f64::EPSILON {
            DQuat::IDENTITY
        } else {
            q.normalize()
        }
    }

    pub fn scale(&self) -> DVec3 {
        DVec3::from_array(self.scale)
    }

    /// Compose into an affine matrix (scale, then rotate, then translate).
    pub fn to_affine(&self) -> DAffine3 {
        DAffine3::from_scale_rotation_translation(self.scale(), self.rotation(), self.location())
    }

    /// Decompose an affine matrix.
    pub fn from_affine(affine: &DAffine3) -> Self {
        let (scale, rotation, location) = affine.to_scale_rotation_translation();
        Self::from_parts(location, rotation, scale)
    }
}

impl Default for JointTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
