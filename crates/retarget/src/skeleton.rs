//! Forward kinematics over rig documents.

use std::collections::HashMap;

use glam::{DAffine3, DVec3};
use pixelpose_common::{PixelposeError, PixelposeResult};
use pixelpose_pose_model::{joint_suffix, JointMap, JointTransform, RigDocument};

/// A rig's joint hierarchy prepared for repeated pose evaluation.
#[derive(Debug, Clone)]
pub struct Skeleton {
    names: Vec<String>,
    parents: Vec<Option<usize>>,
    rest: Vec<DAffine3>,
    world: DAffine3,
    index: HashMap<String, usize>,
}

impl Skeleton {
    /// Build from a rig document. Parents must precede their children.
    pub fn from_rig(rig: &RigDocument) -> PixelposeResult<Self> {
        let mut index = HashMap::with_capacity(rig.joints.len());
        let mut names = Vec::with_capacity(rig.joints.len());
        let mut parents = Vec::with_capacity(rig.joints.len());
        let mut rest = Vec::with_capacity(rig.joints.len());

        for (i, joint) in rig.joints.iter().enumerate() {
            let parent = match &joint.parent {
                Some(parent) => Some(*index.get(parent.as_str()).ok_or_else(|| {
                    PixelposeError::retarget(format!(
                        "Joint '{}' in rig '{}' has unknown parent '{}'",
                        joint.name, rig.name, parent
                    ))
                })?),
                None => None,
            };
            index.insert(joint.name.clone(), i);
            names.push(joint.name.clone());
            parents.push(parent);
            rest.push(joint.rest.to_affine());
        }

        Ok(Self {
            names,
            parents,
            rest,
            world: rig.world.to_affine(),
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Index of the first joint whose suffix matches.
    pub fn index_of_suffix(&self, suffix: &str) -> Option<usize> {
        self.names.iter().position(|n| joint_suffix(n) == suffix)
    }

    /// Armature object transform.
    pub fn armature_world(&self) -> DAffine3 {
        self.world
    }

    /// Identity pose basis for every joint.
    pub fn rest_basis(&self) -> Vec<JointTransform> {
        vec![JointTransform::IDENTITY; self.len()]
    }

    /// Overwrite entries of `basis` from a name-keyed map. Unknown names
    /// are ignored.
    pub fn apply_pose(&self, basis: &mut [JointTransform], pose: &JointMap) {
        for (name, transform) in pose {
            if let Some(i) = self.index_of(name) {
                basis[i] = *transform;
            }
        }
    }

    /// World matrices for a pose basis (one entry per joint).
    ///
    /// `world[i] = armature * local[parent] * rest[i] * basis[i]`.
    pub fn world_transforms(&self, basis: &[JointTransform]) -> Vec<DAffine3> {
        let mut local: Vec<DAffine3> = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            let own = self.rest[i] * basis.get(i).copied().unwrap_or_default().to_affine();
            let composed = match self.parents[i] {
                Some(p) => local[p] * own,
                None => own,
            };
            local.push(composed);
        }
        local.into_iter().map(|m| self.world * m).collect()
    }

    /// World-space joint positions for a pose basis.
    pub fn world_positions(&self, basis: &[JointTransform]) -> Vec<DVec3> {
        self.world_transforms(basis)
            .iter()
            .map(|m| m.translation)
            .collect()
    }

    /// Name-keyed world snapshot.
    pub fn snapshot(&self, world: &[DAffine3]) -> JointMap {
        self.names
            .iter()
            .zip(world)
            .map(|(name, m)| (name.clone(), JointTransform::from_affine(m)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DQuat;
    use pixelpose_pose_model::RigJoint;

    fn chain() -> RigDocument {
        RigDocument {
            name: "Armature".into(),
            fps: 30.0,
            world: JointTransform::IDENTITY,
            joints: vec![
                RigJoint {
                    name: "rig:Hips".into(),
                    parent: None,
                    rest: JointTransform::from_location(0.0, 0.0, 1.0),
                },
                RigJoint {
                    name: "rig:Spine".into(),
                    parent: Some("rig:Hips".into()),
                    rest: JointTransform::from_location(0.0, 0.0, 0.5),
                },
            ],
            bounds: None,
            animation: None,
        }
    }

    #[test]
    fn test_rest_positions_accumulate_offsets() {
        let skeleton = Skeleton::from_rig(&chain()).unwrap();
        let positions = skeleton.world_positions(&skeleton.rest_basis());
        assert!(positions[0].abs_diff_eq(DVec3::new(0.0, 0.0, 1.0), 1e-12));
        assert!(positions[1].abs_diff_eq(DVec3::new(0.0, 0.0, 1.5), 1e-12));
    }

    #[test]
    fn test_parent_rotation_moves_child() {
        let skeleton = Skeleton::from_rig(&chain()).unwrap();
        let mut basis = skeleton.rest_basis();
        basis[0] = JointTransform::from_parts(
            DVec3::ZERO,
            DQuat::from_rotation_x(std::f64::consts::FRAC_PI_2),
            DVec3::ONE,
        );
        let positions = skeleton.world_positions(&basis);
        // Rotating +Z by 90 degrees about X points it along -Y.
        assert!(positions[1].abs_diff_eq(DVec3::new(0.0, -0.5, 1.0), 1e-9));
    }

    #[test]
    fn test_armature_world_applies_last() {
        let mut rig = chain();
        rig.world = JointTransform::from_location(2.0, 0.0, 0.0);
        let skeleton = Skeleton::from_rig(&rig).unwrap();
        let positions = skeleton.world_positions(&skeleton.rest_basis());
        assert!(positions[1].abs_diff_eq(DVec3::new(2.0, 0.0, 1.5), 1e-12));
    }

    #[test]
    fn test_unknown_parent_is_retarget_error() {
        let mut rig = chain();
        rig.joints[1].parent = Some("rig:Missing".into());
        let err = Skeleton::from_rig(&rig).unwrap_err();
        assert!(matches!(err, PixelposeError::Retarget { .. }));
    }

    #[test]
    fn test_snapshot_keys_by_name() {
        let skeleton = Skeleton::from_rig(&chain()).unwrap();
        let snapshot = skeleton.snapshot(&skeleton.world_transforms(&skeleton.rest_basis()));
        assert_eq!(snapshot["rig:Spine"].location, [0.0, 0.0, 1.5]);
        assert_eq!(skeleton.index_of_suffix("Spine"), Some(1));
    }
}
