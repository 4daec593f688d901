//! Suffix-based joint mapping between two rigs.

use pixelpose_pose_model::{joint_suffix, JointMap, JointTransform};

use crate::skeleton::Skeleton;

/// Which source joint drives each target joint.
///
/// Built once per job. Target joints with no counterpart on the source
/// keep whatever basis they already have.
#[derive(Debug, Clone)]
pub struct JointMapping {
    /// `(target index, source joint name)` pairs in target order.
    pairs: Vec<(usize, String)>,
}

impl JointMapping {
    /// Match every target joint to the first source joint with the same
    /// suffix.
    pub fn by_suffix(source: &Skeleton, target: &Skeleton) -> Self {
        let pairs = target
            .names()
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                let suffix = joint_suffix(name);
                source
                    .index_of_suffix(suffix)
                    .map(|s| (i, source.names()[s].clone()))
            })
            .collect();
        Self { pairs }
    }

    /// Number of target joints that have a source counterpart.
    pub fn matched(&self) -> usize {
        self.pairs.len()
    }

    /// Copy the source's local bases onto `target_basis`.
    ///
    /// `source_pose` holds the keyed local bases for one frame; source
    /// joints it does not mention are at rest. Returns the keyframe that
    /// was written: matched target joint name to its new basis.
    pub fn transfer(
        &self,
        target: &Skeleton,
        source_pose: &JointMap,
        target_basis: &mut [JointTransform],
    ) -> JointMap {
        let mut keyframe = JointMap::new();
        for (target_index, source_name) in &self.pairs {
            let basis = source_pose
                .get(source_name)
                .copied()
                .unwrap_or(JointTransform::IDENTITY);
            target_basis[*target_index] = basis;
            keyframe.insert(target.names()[*target_index].clone(), basis);
        }
        keyframe
    }
}
