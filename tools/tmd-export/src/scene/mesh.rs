//! Mesh snapshot

use serde::{Deserialize, Serialize};

use super::check_name;
use crate::error::SnapshotError;

/// Evaluated mesh data of the exported object, in object space.
///
/// Corners ("loops") carry their own normal; the optional UV layer has one
/// entry per loop. Polygons reference a contiguous run of loops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub vertices: Vec<[f32; 3]>,
    /// Vertex group names, indexed by [`GroupWeight::group`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertex_groups: Vec<String>,
    /// Per-vertex group memberships; empty or one entry per vertex
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertex_weights: Vec<Vec<GroupWeight>>,
    pub loops: Vec<LoopSnapshot>,
    /// Active UV layer, one coordinate per loop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_layer: Option<Vec<[f32; 2]>>,
    pub polygons: Vec<PolygonSnapshot>,
    /// Material slot names, indexed by [`PolygonSnapshot::material_index`]
    #[serde(default)]
    pub materials: Vec<String>,
}

/// Membership of a vertex in a vertex group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupWeight {
    pub group: usize,
    pub weight: f32,
}

/// One polygon corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopSnapshot {
    pub vertex: u32,
    /// Split (per-corner) normal
    pub normal: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonSnapshot {
    pub loop_start: u32,
    pub loop_total: u32,
    #[serde(default)]
    pub material_index: u32,
}

impl PolygonSnapshot {
    /// Loop indices of this polygon, in winding order
    pub fn loop_indices(&self) -> std::ops::Range<u32> {
        self.loop_start..self.loop_start.saturating_add(self.loop_total)
    }
}

impl MeshSnapshot {
    pub(crate) fn validate(&self) -> Result<(), SnapshotError> {
        let vertex_count = self.vertices.len();
        let loop_count = self.loops.len();

        for (loop_index, corner) in self.loops.iter().enumerate() {
            if corner.vertex as usize >= vertex_count {
                return Err(SnapshotError::LoopVertexOutOfRange {
                    loop_index,
                    vertex: corner.vertex,
                    vertex_count,
                });
            }
        }

        for (polygon, poly) in self.polygons.iter().enumerate() {
            let loop_end = poly.loop_start as u64 + poly.loop_total as u64;
            if loop_end > loop_count as u64 {
                return Err(SnapshotError::PolygonLoopsOutOfRange {
                    polygon,
                    loop_start: poly.loop_start,
                    loop_end,
                    loop_count,
                });
            }
        }

        if let Some(uvs) = &self.uv_layer {
            if uvs.len() != loop_count {
                return Err(SnapshotError::UvLayerLength {
                    expected: loop_count,
                    found: uvs.len(),
                });
            }
        }

        if !self.vertex_weights.is_empty() {
            if self.vertex_weights.len() != vertex_count {
                return Err(SnapshotError::VertexWeightsLength {
                    expected: vertex_count,
                    found: self.vertex_weights.len(),
                });
            }
            let group_count = self.vertex_groups.len();
            for (vertex, weights) in self.vertex_weights.iter().enumerate() {
                if let Some(bad) = weights.iter().find(|w| w.group >= group_count) {
                    return Err(SnapshotError::VertexGroupOutOfRange {
                        vertex,
                        group: bad.group,
                        group_count,
                    });
                }
            }
        }

        for material in &self.materials {
            check_name("material", material)?;
        }

        Ok(())
    }
}
