//! Types and constants for geometry flattening

use glam::{Vec2, Vec3};
use hashbrown::HashMap;

use super::weights::WeightGroups;
use crate::scene::GroupWeight;

/// Output vertex indices start here; 0 means "unused".
pub const FIRST_VERTEX_INDEX: u32 = 1;

/// Weights per attribute block (one vec4 per vertex)
pub const WEIGHTS_PER_GROUP: usize = 4;

/// Maximum number of bone weight attribute blocks
pub const MAX_WEIGHT_GROUPS: usize = 8;

/// Bones past this index get no weights in the output
pub const MAX_WEIGHTED_BONES: usize = WEIGHTS_PER_GROUP * MAX_WEIGHT_GROUPS;

/// One corner of the mesh, already in target space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Source vertex index
    pub vertex: u32,
    pub normal: Vec3,
    pub uv: Option<Vec2>,
}

/// A triangle as three corner (loop) indices in winding order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshTriangle {
    pub corners: [u32; 3],
    pub material: u32,
}

/// Triangulated mesh in target space, ready for flattening
#[derive(Debug, Clone, Default)]
pub struct PreparedMesh {
    /// Per source vertex
    pub positions: Vec<Vec3>,
    /// Per loop
    pub corners: Vec<Corner>,
    pub triangles: Vec<MeshTriangle>,
    pub material_count: usize,
}

/// Skin weights of the source mesh, resolved against a skeleton
#[derive(Debug, Clone, Copy)]
pub struct SkinBinding<'a> {
    /// Vertex group names, indexed by [`GroupWeight::group`]
    pub vertex_groups: &'a [String],
    /// Per source vertex; may be empty when no vertex is weighted
    pub vertex_weights: &'a [Vec<GroupWeight>],
    /// Bone name → 0-based bone index
    pub bone_indices: &'a HashMap<String, usize>,
    pub bone_count: usize,
}

/// Identity of an output vertex: source vertex plus frozen normal and UV.
///
/// Floats are frozen to their bit patterns so the key is hashable and compares
/// exactly; `-0.0` is folded into `0.0` so equal values always share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexKey {
    pub vertex: u32,
    normal: [u32; 3],
    uv: Option<[u32; 2]>,
}

#[inline]
fn freeze(v: f32) -> u32 {
    if v == 0.0 { 0 } else { v.to_bits() }
}

impl VertexKey {
    pub fn new(vertex: u32, normal: Vec3, uv: Option<Vec2>) -> Self {
        Self {
            vertex,
            normal: [freeze(normal.x), freeze(normal.y), freeze(normal.z)],
            uv: uv.map(|uv| [freeze(uv.x), freeze(uv.y)]),
        }
    }
}

/// An emitted vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Option<Vec2>,
}

impl FlatVertex {
    /// Position padded to a point (w = 1)
    pub fn position4(&self) -> [f32; 4] {
        self.position.extend(1.0).to_array()
    }

    /// Normal padded to a direction (w = 0)
    pub fn normal4(&self) -> [f32; 4] {
        self.normal.extend(0.0).to_array()
    }

    /// UV padded with zeros; all zeros when the mesh has no UV layer
    pub fn uv4(&self) -> [f32; 4] {
        let uv = self.uv.unwrap_or(Vec2::ZERO);
        [uv.x, uv.y, 0.0, 0.0]
    }
}

/// Output of the flattener
#[derive(Debug, Clone)]
pub struct FlattenedMesh {
    /// Distinct vertices; `vertices[i]` has output index `i + 1`
    pub vertices: Vec<FlatVertex>,
    /// Output indices of every triangle's corners, in triangle order
    pub triangle_indices: Vec<[u32; 3]>,
    /// Triangles grouped by material slot, ascending slot order
    pub material_triangles: Vec<Vec<[u32; 3]>>,
    /// Triangles whose material slot does not exist
    pub orphaned_triangles: usize,
    pub weight_groups: WeightGroups,
    /// Bones that received no weight block because of the group cap
    pub dropped_bones: usize,
}

impl FlattenedMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Output index of the given triangle corner
    pub fn corner_index(&self, triangle: usize, slot: usize) -> Option<u32> {
        self.triangle_indices.get(triangle)?.get(slot).copied()
    }
}
