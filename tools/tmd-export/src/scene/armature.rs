//! Armature snapshot

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::{check_name, identity_rows};
use crate::error::SnapshotError;

/// Bone hierarchy deforming the exported mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArmatureSnapshot {
    /// Armature-to-world transform, row-major
    #[serde(default = "identity_rows")]
    pub world: [[f32; 4]; 4],
    pub bones: Vec<BoneSnapshot>,
}

/// One bone in rest position.
///
/// `head` and `matrix` are relative to the parent bone; for root bones they
/// are in armature space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoneSnapshot {
    pub name: String,
    /// Index of the parent in [`ArmatureSnapshot::bones`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    pub head: [f32; 3],
    /// Rest orientation, row-major 3×3
    #[serde(default = "identity3_rows")]
    pub matrix: [[f32; 3]; 3],
    #[serde(default)]
    pub length: f32,
    #[serde(default)]
    pub rotation_mode: RotationMode,
}

fn identity3_rows() -> [[f32; 3]; 3] {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

/// Which pose channels drive a bone's rotation.
///
/// Euler orders name the axis applied first: `XYZ` rotates about X, then Y,
/// then Z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationMode {
    #[default]
    #[serde(rename = "quaternion")]
    Quaternion,
    #[serde(rename = "XYZ")]
    Xyz,
    #[serde(rename = "XZY")]
    Xzy,
    #[serde(rename = "YXZ")]
    Yxz,
    #[serde(rename = "YZX")]
    Yzx,
    #[serde(rename = "ZXY")]
    Zxy,
    #[serde(rename = "ZYX")]
    Zyx,
}

impl ArmatureSnapshot {
    /// Bone indices in hierarchy order: depth-first from each root, roots and
    /// siblings in snapshot order. Every parent precedes its children.
    pub fn traversal_order(&self) -> Result<Vec<usize>, SnapshotError> {
        let bone_count = self.bones.len();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); bone_count];
        let mut roots = Vec::new();

        for (index, bone) in self.bones.iter().enumerate() {
            match bone.parent {
                None => roots.push(index),
                Some(parent) if parent < bone_count => children[parent].push(index),
                Some(parent) => {
                    return Err(SnapshotError::BoneParentOutOfRange {
                        bone: bone.name.clone(),
                        parent,
                        bone_count,
                    });
                }
            }
        }

        let mut order = Vec::with_capacity(bone_count);
        let mut stack: Vec<usize> = roots.into_iter().rev().collect();
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(children[index].iter().rev());
        }

        if order.len() < bone_count {
            // Anything unreachable from a root hangs off a cycle
            let mut visited = vec![false; bone_count];
            for &index in &order {
                visited[index] = true;
            }
            let stuck = visited.iter().position(|v| !v).unwrap_or_default();
            return Err(SnapshotError::BoneCycle(self.bones[stuck].name.clone()));
        }

        Ok(order)
    }

    pub(crate) fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.bones.len());
        for bone in &self.bones {
            check_name("bone", &bone.name)?;
            if !seen.insert(bone.name.as_str()) {
                return Err(SnapshotError::DuplicateBoneName(bone.name.clone()));
            }
        }
        self.traversal_order()?;
        Ok(())
    }
}
