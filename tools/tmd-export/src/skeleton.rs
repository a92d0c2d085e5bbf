//! Skeleton baking (armature snapshot -> TMD bones)
//!
//! Bones get 1-based export indices in hierarchy order, so every parent is
//! written before its children. The bind matrix of a bone is
//! `space * T(head) * M` where `M` is its rest orientation. Child bones are
//! parent-relative and use an identity `space`; root bones use
//! `axis_remap * armature.world`.

use glam::{Mat4, Vec3};
use hashbrown::HashMap;

use crate::error::SnapshotError;
use crate::scene::{ArmatureSnapshot, RotationMode};
use crate::space::{CoordinateSpace, mat3_from_rows};

/// A bone ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct BakedBone {
    /// 1-based export index
    pub index: u32,
    pub name: String,
    pub length: f32,
    /// Export index of the parent, `None` for roots
    pub parent: Option<u32>,
    /// Rest transform relative to the parent (armature space for roots)
    pub rest: Mat4,
    /// Transform applied in front of `rest` and every pose sample
    pub space: Mat4,
    pub rotation_mode: RotationMode,
}

impl BakedBone {
    /// Bind-pose matrix as written to the file
    pub fn bind(&self) -> Mat4 {
        self.space * self.rest
    }

    /// Pose sample for a given pose basis
    pub fn sample(&self, basis: Mat4) -> Mat4 {
        self.space * self.rest * basis
    }
}

/// Baked bone hierarchy in export order
#[derive(Debug, Clone, Default)]
pub struct BakedSkeleton {
    bones: Vec<BakedBone>,
    by_name: HashMap<String, usize>,
}

impl BakedSkeleton {
    /// Bake an armature snapshot
    pub fn bake(armature: &ArmatureSnapshot, axis_remap: Mat4) -> Result<Self, SnapshotError> {
        let order = armature.traversal_order()?;
        let root_space = CoordinateSpace::from_world(axis_remap, &armature.world).matrix();

        // Snapshot index -> export index
        let mut export_index = vec![0u32; armature.bones.len()];
        for (position, &source) in order.iter().enumerate() {
            export_index[source] = position as u32 + 1;
        }

        let mut bones = Vec::with_capacity(order.len());
        let mut by_name = HashMap::with_capacity(order.len());
        for &source in &order {
            let bone = &armature.bones[source];
            let rest = Mat4::from_translation(Vec3::from_array(bone.head))
                * Mat4::from_mat3(mat3_from_rows(&bone.matrix));
            let parent = bone.parent.map(|p| export_index[p]);

            by_name.insert(bone.name.clone(), bones.len());
            bones.push(BakedBone {
                index: export_index[source],
                name: bone.name.clone(),
                length: bone.length,
                parent,
                rest,
                space: if parent.is_some() {
                    Mat4::IDENTITY
                } else {
                    root_space
                },
                rotation_mode: bone.rotation_mode,
            });
        }

        tracing::debug!(
            "Baked skeleton: {} bones, {} roots",
            bones.len(),
            bones.iter().filter(|b| b.parent.is_none()).count()
        );

        Ok(Self { bones, by_name })
    }

    /// Bones in export order (`bones()[i].index == i + 1`)
    pub fn bones(&self) -> &[BakedBone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&BakedBone> {
        self.by_name.get(name).map(|&i| &self.bones[i])
    }

    /// Bone name -> 0-based weight slot (export index - 1)
    pub fn weight_slots(&self) -> &HashMap<String, usize> {
        &self.by_name
    }

    /// `(child, parent)` export indices for every non-root bone, child order
    pub fn parent_links(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.bones
            .iter()
            .filter_map(|bone| bone.parent.map(|parent| (bone.index, parent)))
    }
}
