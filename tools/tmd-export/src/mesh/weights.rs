//! Bone weight packing
//!
//! A vertex's weights form one dense vector over all bones. That vector is cut
//! into blocks of four (`boneWeights1` covers bones 0-3, `boneWeights2` bones
//! 4-7, ...). A block array is only materialized once some vertex puts a
//! non-zero weight into it; earlier vertices are backfilled with zeros so all
//! arrays stay index-aligned with the vertex array.

use glam::Vec4;

use super::types::{MAX_WEIGHT_GROUPS, SkinBinding, WEIGHTS_PER_GROUP};

/// Per-vertex weight blocks
#[derive(Debug, Clone)]
pub struct WeightGroups {
    /// Blocks the skeleton needs, capped at [`MAX_WEIGHT_GROUPS`]
    group_count: usize,
    vertex_count: usize,
    groups: [Option<Vec<Vec4>>; MAX_WEIGHT_GROUPS],
}

impl WeightGroups {
    /// Blocks for a skeleton of `bone_count` bones
    pub fn new(bone_count: usize) -> Self {
        Self {
            group_count: bone_count.div_ceil(WEIGHTS_PER_GROUP).min(MAX_WEIGHT_GROUPS),
            vertex_count: 0,
            groups: Default::default(),
        }
    }

    /// No skeleton: vertices are tracked but no block ever materializes
    pub fn unskinned() -> Self {
        Self::new(0)
    }

    /// Append one vertex's dense weight vector (indexed by bone).
    ///
    /// Weights of bones past the group cap are ignored.
    pub fn push(&mut self, weights: &[f32]) {
        for (group, slot) in self.groups.iter_mut().enumerate().take(self.group_count) {
            let start = group * WEIGHTS_PER_GROUP;
            let mut block = [0.0f32; WEIGHTS_PER_GROUP];
            if let Some(chunk) = weights.get(start..) {
                for (dst, src) in block.iter_mut().zip(chunk) {
                    *dst = *src;
                }
            }
            let block = Vec4::from_array(block);

            match slot {
                Some(column) => column.push(block),
                None if block != Vec4::ZERO => {
                    let mut column = Vec::with_capacity(self.vertex_count + 1);
                    column.resize(self.vertex_count, Vec4::ZERO);
                    column.push(block);
                    *slot = Some(column);
                }
                None => {}
            }
        }
        self.vertex_count += 1;
    }

    /// Number of blocks the skeleton spans (after the cap)
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Number of vertices pushed so far
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Materialized blocks as `(group, per-vertex values)`, ascending group
    pub fn materialized(&self) -> impl Iterator<Item = (usize, &[Vec4])> + '_ {
        self.groups
            .iter()
            .enumerate()
            .filter_map(|(group, column)| column.as_deref().map(|values| (group, values)))
    }

    /// Value of one block for one vertex (zero if the block never materialized)
    pub fn get(&self, group: usize, vertex: usize) -> Vec4 {
        self.groups
            .get(group)
            .and_then(|column| column.as_ref())
            .and_then(|values| values.get(vertex).copied())
            .unwrap_or(Vec4::ZERO)
    }
}

/// Attribute name of a weight block
pub fn bone_weights_attrib(group: usize) -> String {
    format!("boneWeights{}", group + 1)
}

impl SkinBinding<'_> {
    /// Dense weight vector of a source vertex, one slot per bone.
    ///
    /// Groups that do not name a bone are ignored; bones the vertex is not
    /// a member of weigh 0.0.
    pub fn dense_weights(&self, vertex: usize) -> Vec<f32> {
        let mut weights = vec![0.0f32; self.bone_count];
        let Some(memberships) = self.vertex_weights.get(vertex) else {
            return weights;
        };
        for membership in memberships {
            let Some(name) = self.vertex_groups.get(membership.group) else {
                continue;
            };
            if let Some(&bone) = self.bone_indices.get(name.as_str()) {
                if let Some(slot) = weights.get_mut(bone) {
                    *slot = membership.weight;
                }
            }
        }
        weights
    }
}
