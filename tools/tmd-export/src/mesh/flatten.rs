//! Corner → output vertex flattening
//!
//! Every triangle corner is keyed by (source vertex, normal, UV). Corners with
//! equal keys share one output vertex; the first corner with a new key
//! allocates the next output index. Indices start at
//! [`FIRST_VERTEX_INDEX`] and grow without gaps.

use hashbrown::HashMap;

use super::types::{
    FIRST_VERTEX_INDEX, FlatVertex, FlattenedMesh, MAX_WEIGHTED_BONES, PreparedMesh, SkinBinding,
    VertexKey,
};
use super::weights::WeightGroups;
use crate::error::SnapshotError;

/// Flatten a prepared mesh into output vertices and per-material triangles.
///
/// With a skin binding, every output vertex carries the dense weight vector of
/// its source vertex. Bones past [`MAX_WEIGHTED_BONES`] are reported once and
/// lose their weights; the export carries on.
pub fn flatten(
    mesh: &PreparedMesh,
    skin: Option<&SkinBinding<'_>>,
) -> Result<FlattenedMesh, SnapshotError> {
    let bone_count = skin.map_or(0, |skin| skin.bone_count);
    let dropped_bones = bone_count.saturating_sub(MAX_WEIGHTED_BONES);
    if dropped_bones > 0 {
        tracing::warn!(
            "Skeleton has {} bones, only the first {} can carry weights; dropping {}",
            bone_count,
            MAX_WEIGHTED_BONES,
            dropped_bones
        );
    }

    let mut identities: HashMap<VertexKey, u32> = HashMap::with_capacity(mesh.corners.len());
    let mut vertices = Vec::new();
    let mut weight_groups = WeightGroups::new(bone_count);
    let mut next_index = FIRST_VERTEX_INDEX;
    let mut triangle_indices = Vec::with_capacity(mesh.triangles.len());

    for triangle in &mesh.triangles {
        let mut indices = [0u32; 3];
        for (slot, &loop_index) in indices.iter_mut().zip(&triangle.corners) {
            let corner = mesh.corners.get(loop_index as usize).ok_or(
                SnapshotError::PolygonLoopsOutOfRange {
                    polygon: triangle_indices.len(),
                    loop_start: loop_index,
                    loop_end: loop_index as u64 + 1,
                    loop_count: mesh.corners.len(),
                },
            )?;

            let key = VertexKey::new(corner.vertex, corner.normal, corner.uv);
            if let Some(&index) = identities.get(&key) {
                *slot = index;
                continue;
            }

            let position = *mesh.positions.get(corner.vertex as usize).ok_or(
                SnapshotError::LoopVertexOutOfRange {
                    loop_index: loop_index as usize,
                    vertex: corner.vertex,
                    vertex_count: mesh.positions.len(),
                },
            )?;

            vertices.push(FlatVertex {
                position,
                normal: corner.normal,
                uv: corner.uv,
            });
            match skin {
                Some(skin) => weight_groups.push(&skin.dense_weights(corner.vertex as usize)),
                None => weight_groups.push(&[]),
            }

            identities.insert(key, next_index);
            *slot = next_index;
            next_index += 1;
        }
        triangle_indices.push(indices);
    }

    let mut material_triangles = vec![Vec::new(); mesh.material_count];
    let mut orphaned_triangles = 0;
    for (triangle, indices) in mesh.triangles.iter().zip(&triangle_indices) {
        match material_triangles.get_mut(triangle.material as usize) {
            Some(bucket) => bucket.push(*indices),
            None => orphaned_triangles += 1,
        }
    }
    if orphaned_triangles > 0 {
        tracing::warn!(
            "{} triangles reference a material slot that does not exist ({} slots); they are not exported",
            orphaned_triangles,
            mesh.material_count
        );
    }

    tracing::debug!(
        "Flattened {} corners into {} vertices",
        mesh.triangles.len() * 3,
        vertices.len()
    );

    Ok(FlattenedMesh {
        vertices,
        triangle_indices,
        material_triangles,
        orphaned_triangles,
        weight_groups,
        dropped_bones,
    })
}
