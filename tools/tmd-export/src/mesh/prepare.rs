//! Snapshot → target-space triangle mesh

use glam::{Vec2, Vec3};

use super::types::{Corner, MeshTriangle, PreparedMesh};
use crate::scene::MeshSnapshot;
use crate::space::CoordinateSpace;

/// Transform a mesh snapshot into target space and split its polygons into
/// triangles.
///
/// Triangles pass through untouched. Larger polygons are fan-triangulated
/// around their first corner (fine for the convex faces hosts produce);
/// polygons with fewer than three corners are dropped.
pub fn prepare_mesh(mesh: &MeshSnapshot, space: &CoordinateSpace) -> PreparedMesh {
    let positions = mesh
        .vertices
        .iter()
        .map(|&p| space.point(Vec3::from_array(p)))
        .collect();

    let uvs = mesh.uv_layer.as_deref();
    let corners = mesh
        .loops
        .iter()
        .enumerate()
        .map(|(i, corner)| Corner {
            vertex: corner.vertex,
            normal: space.normal(Vec3::from_array(corner.normal)),
            uv: uvs.and_then(|uvs| uvs.get(i)).map(|&uv| Vec2::from_array(uv)),
        })
        .collect();

    let mut triangles = Vec::with_capacity(mesh.polygons.len());
    let mut degenerate = 0usize;
    let mut split = 0usize;

    for polygon in &mesh.polygons {
        let loops: Vec<u32> = polygon.loop_indices().collect();
        if loops.len() < 3 {
            degenerate += 1;
            continue;
        }
        if loops.len() > 3 {
            split += 1;
        }
        for i in 1..loops.len() - 1 {
            triangles.push(MeshTriangle {
                corners: [loops[0], loops[i], loops[i + 1]],
                material: polygon.material_index,
            });
        }
    }

    if degenerate > 0 {
        tracing::warn!("Dropped {} polygons with fewer than 3 corners", degenerate);
    }
    if split > 0 {
        tracing::debug!("Fan-triangulated {} polygons with more than 3 corners", split);
    }

    PreparedMesh {
        positions,
        corners,
        triangles,
        material_count: mesh.materials.len(),
    }
}
