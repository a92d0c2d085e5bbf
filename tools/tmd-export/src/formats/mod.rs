//! Section writers for TMD files
//!
//! Re-exports the record types from tmd-common and adds one writer per file
//! section. Each writer only emits records; ordering between sections is
//! decided by the export orchestrator.

pub use tmd_common::formats::*;

use std::io::{self, Write};

use crate::animation::BakedAction;
use crate::mesh::{FlattenedMesh, bone_weights_attrib};
use crate::skeleton::BakedSkeleton;
use crate::space::to_row_major;

/// Attribute name of vertex positions
pub const ATTRIB_VERTEX: &str = "vertex";
/// Attribute name of vertex normals
pub const ATTRIB_NORMAL: &str = "normal";
/// Attribute name of texture coordinates
pub const ATTRIB_TEXCO: &str = "texCo";

/// Write one binding per material slot, each followed by its triangles.
///
/// Slots without triangles still get their binding record. Returns the
/// number of triangles written.
pub fn write_material_bindings<W: Write>(
    w: &mut RecordWriter<W>,
    materials: &[String],
    mesh: &FlattenedMesh,
) -> io::Result<usize> {
    let mut written = 0;
    for (material, triangles) in materials.iter().zip(&mesh.material_triangles) {
        w.write(&NewBinding { material })?;
        for &indices in triangles {
            w.write(&Triangle(indices))?;
        }
        written += triangles.len();
    }
    Ok(written)
}

/// Write one attribute array: header then one `vertex` record per element
fn write_attribute<W: Write>(
    w: &mut RecordWriter<W>,
    name: &str,
    values: impl Iterator<Item = [f32; 4]>,
) -> io::Result<()> {
    w.write(&VertexAttrib { name })?;
    for value in values {
        w.write(&Vertex(value))?;
    }
    Ok(())
}

/// Write every non-empty vertex attribute array, in the order
/// `vertex, normal, texCo, boneWeights1..8`.
///
/// Returns the number of arrays written.
pub fn write_vertex_attributes<W: Write>(
    w: &mut RecordWriter<W>,
    mesh: &FlattenedMesh,
) -> io::Result<usize> {
    if mesh.vertices.is_empty() {
        return Ok(0);
    }

    write_attribute(w, ATTRIB_VERTEX, mesh.vertices.iter().map(|v| v.position4()))?;
    write_attribute(w, ATTRIB_NORMAL, mesh.vertices.iter().map(|v| v.normal4()))?;
    write_attribute(w, ATTRIB_TEXCO, mesh.vertices.iter().map(|v| v.uv4()))?;

    let mut arrays = 3;
    for (group, values) in mesh.weight_groups.materialized() {
        let name = bone_weights_attrib(group);
        write_attribute(w, &name, values.iter().map(|v| v.to_array()))?;
        arrays += 1;
    }
    Ok(arrays)
}

/// Write bone definitions, then bone names, then parent links
pub fn write_skeleton<W: Write>(
    w: &mut RecordWriter<W>,
    skeleton: &BakedSkeleton,
) -> io::Result<()> {
    for bone in skeleton.bones() {
        w.write(&NewBone {
            length: bone.length,
            matrix: to_row_major(&bone.bind()),
        })?;
    }
    for bone in skeleton.bones() {
        w.write(&NameBone {
            bone: bone.index,
            name: &bone.name,
        })?;
    }
    for (child, parent) in skeleton.parent_links() {
        w.write(&ParentBone { child, parent })?;
    }
    Ok(())
}

/// Write one baked action: header, then each curve with its samples
pub fn write_action<W: Write>(w: &mut RecordWriter<W>, action: &BakedAction) -> io::Result<()> {
    w.write(&NewAction {
        name: &action.name,
        frame_count: action.frame_count,
    })?;
    for curve in &action.curves {
        w.write(&NewCurve { bone: curve.bone })?;
        for sample in &curve.samples {
            w.write(&CurveSample {
                matrix: to_row_major(sample),
            })?;
        }
    }
    Ok(())
}
