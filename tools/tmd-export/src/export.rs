//! Export orchestration (scene snapshot -> .tmd)
//!
//! An export runs in two phases. [`ExportPlan::prepare`] checks the snapshot
//! and computes everything: flattened geometry, baked skeleton and baked
//! actions. Only then does [`ExportPlan::write`] emit the file, section by
//! section in [`Section::ORDER`]. Input problems therefore never leave a
//! partial file; only I/O failures can.

use glam::Mat4;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::animation::{BakedAction, bake_actions};
use crate::error::{ExportError, Result};
use crate::formats::{
    RecordWriter, write_action, write_material_bindings, write_skeleton, write_vertex_attributes,
};
use crate::mesh::{FlattenedMesh, SkinBinding, flatten, prepare_mesh};
use crate::scene::SceneSnapshot;
use crate::skeleton::BakedSkeleton;
use crate::space::{AxisPreset, CoordinateSpace, Y_UP_FROM_Z_UP};

/// Caller-chosen export settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Maps authoring space to target space; composed with world matrices
    pub axis_remap: Mat4,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            axis_remap: Y_UP_FROM_Z_UP,
        }
    }
}

impl From<AxisPreset> for ExportOptions {
    fn from(preset: AxisPreset) -> Self {
        Self {
            axis_remap: preset.matrix(),
        }
    }
}

/// File sections, in the order they are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// `version`
    Header,
    /// `newBinding` + `triangle` per material slot
    Bindings,
    /// `vertexAttrib` + `vertex` per non-empty array
    VertexAttributes,
    /// `newBone`, `nameBone`, `parentBone`
    Skeleton,
    /// `newAction`, `newCurve`, `curveSample`
    Actions,
    /// `done`
    Terminator,
}

impl Section {
    pub const ORDER: [Section; 6] = [
        Section::Header,
        Section::Bindings,
        Section::VertexAttributes,
        Section::Skeleton,
        Section::Actions,
        Section::Terminator,
    ];
}

/// What an export produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub material_count: usize,
    pub bone_count: usize,
    /// Bone weight arrays written
    pub weight_groups: usize,
    pub actions_written: usize,
    pub actions_skipped: usize,
}

/// A fully computed export, ready to be written
#[derive(Debug)]
pub struct ExportPlan<'a> {
    scene: &'a SceneSnapshot,
    mesh: FlattenedMesh,
    skeleton: Option<BakedSkeleton>,
    actions: Vec<BakedAction>,
}

impl<'a> ExportPlan<'a> {
    /// Validate the snapshot and compute every section
    pub fn prepare(scene: &'a SceneSnapshot, options: &ExportOptions) -> Result<Self> {
        let object = &scene.object;
        if !object.kind.is_exportable() {
            return Err(ExportError::UnsupportedObject {
                name: object.name.clone(),
                kind: object.kind,
            });
        }
        scene.validate()?;

        let space = CoordinateSpace::from_world(options.axis_remap, &object.world);
        let prepared = prepare_mesh(&scene.mesh, &space);

        let skeleton = scene
            .armature
            .as_ref()
            .map(|armature| BakedSkeleton::bake(armature, options.axis_remap))
            .transpose()?;

        let skin = skeleton.as_ref().map(|skeleton| SkinBinding {
            vertex_groups: &scene.mesh.vertex_groups,
            vertex_weights: &scene.mesh.vertex_weights,
            bone_indices: skeleton.weight_slots(),
            bone_count: skeleton.len(),
        });
        let mesh = flatten(&prepared, skin.as_ref())?;

        let actions = match &skeleton {
            Some(skeleton) => bake_actions(&scene.actions, skeleton),
            None => {
                if !scene.actions.is_empty() {
                    tracing::debug!(
                        "'{}' has no armature, ignoring {} actions",
                        object.name,
                        scene.actions.len()
                    );
                }
                Vec::new()
            }
        };

        Ok(Self {
            scene,
            mesh,
            skeleton,
            actions,
        })
    }

    pub fn mesh(&self) -> &FlattenedMesh {
        &self.mesh
    }

    pub fn skeleton(&self) -> Option<&BakedSkeleton> {
        self.skeleton.as_ref()
    }

    pub fn actions(&self) -> &[BakedAction] {
        &self.actions
    }

    /// Emit every section and the terminator
    pub fn write<W: Write>(&self, out: W) -> io::Result<ExportSummary> {
        let mut w = RecordWriter::new(out);
        let mut summary = ExportSummary {
            vertex_count: self.mesh.vertex_count(),
            material_count: self.scene.mesh.materials.len(),
            bone_count: self.skeleton.as_ref().map_or(0, BakedSkeleton::len),
            weight_groups: self.mesh.weight_groups.materialized().count(),
            actions_written: self.actions.len(),
            actions_skipped: self.scene.actions.len() - self.actions.len(),
            ..Default::default()
        };

        for section in Section::ORDER {
            match section {
                Section::Header => w.write_version()?,
                Section::Bindings => {
                    summary.triangle_count =
                        write_material_bindings(&mut w, &self.scene.mesh.materials, &self.mesh)?;
                }
                Section::VertexAttributes => {
                    write_vertex_attributes(&mut w, &self.mesh)?;
                }
                Section::Skeleton => {
                    if let Some(skeleton) = &self.skeleton {
                        write_skeleton(&mut w, skeleton)?;
                    }
                }
                Section::Actions => {
                    for action in &self.actions {
                        write_action(&mut w, action)?;
                    }
                }
                Section::Terminator => w.finish()?,
            }
            tracing::trace!("{:?} done, {} records so far", section, w.records_written());
        }

        tracing::debug!(
            "Wrote {} records ({} bytes)",
            w.records_written(),
            w.bytes_written()
        );
        Ok(summary)
    }
}

fn log_summary(name: &str, summary: &ExportSummary) {
    tracing::info!(
        "Exported '{}': {} vertices, {} triangles, {} materials, {} bones, {} actions",
        name,
        summary.vertex_count,
        summary.triangle_count,
        summary.material_count,
        summary.bone_count,
        summary.actions_written
    );
    if summary.actions_skipped > 0 {
        tracing::info!("  {} actions produced no curves", summary.actions_skipped);
    }
}

/// Export a scene snapshot into any byte sink
pub fn export_scene<W: Write>(
    scene: &SceneSnapshot,
    options: &ExportOptions,
    out: W,
) -> Result<ExportSummary> {
    let plan = ExportPlan::prepare(scene, options)?;
    let summary = plan.write(out)?;
    log_summary(&scene.object.name, &summary);
    Ok(summary)
}

/// Export a scene snapshot to a `.tmd` file.
///
/// The file is only created once the snapshot has been checked and every
/// section computed.
pub fn export_to_file(
    scene: &SceneSnapshot,
    options: &ExportOptions,
    path: &Path,
) -> Result<ExportSummary> {
    let plan = ExportPlan::prepare(scene, options)?;
    let file = File::create(path)?;
    let summary = plan.write(BufWriter::new(file))?;
    log_summary(&scene.object.name, &summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{
        LoopSnapshot, MeshSnapshot, ObjectKind, ObjectSnapshot, PolygonSnapshot, identity_rows,
    };

    fn scene(kind: ObjectKind) -> SceneSnapshot {
        SceneSnapshot {
            object: ObjectSnapshot {
                name: "Tri".to_string(),
                kind,
                world: identity_rows(),
            },
            mesh: MeshSnapshot {
                vertices: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                loops: (0..3)
                    .map(|vertex| LoopSnapshot {
                        vertex,
                        normal: [0.0, 0.0, 1.0],
                    })
                    .collect(),
                polygons: vec![PolygonSnapshot {
                    loop_start: 0,
                    loop_total: 3,
                    material_index: 0,
                }],
                materials: vec!["Mat".to_string()],
                ..Default::default()
            },
            armature: None,
            actions: vec![],
        }
    }

    #[test]
    fn test_section_order_ends_with_terminator() {
        assert_eq!(Section::ORDER.first(), Some(&Section::Header));
        assert_eq!(Section::ORDER.last(), Some(&Section::Terminator));
    }

    #[test]
    fn test_summary_of_single_triangle() {
        let mut out = Vec::new();
        let summary = export_scene(&scene(ObjectKind::Mesh), &ExportOptions::default(), &mut out)
            .unwrap();
        assert_eq!(
            summary,
            ExportSummary {
                vertex_count: 3,
                triangle_count: 1,
                material_count: 1,
                ..Default::default()
            }
        );
        assert_eq!(out.first(), Some(&0x01));
        assert_eq!(out.last(), Some(&0x00));
    }

    #[test]
    fn test_unsupported_object_writes_nothing() {
        let mut out = Vec::new();
        let err = export_scene(&scene(ObjectKind::Camera), &ExportOptions::default(), &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::UnsupportedObject {
                kind: ObjectKind::Camera,
                ..
            }
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_invalid_snapshot_writes_nothing() {
        let mut bad = scene(ObjectKind::Mesh);
        bad.mesh.loops[0].vertex = 9;
        let mut out = Vec::new();
        let err = export_scene(&bad, &ExportOptions::default(), &mut out).unwrap_err();
        assert!(matches!(err, ExportError::Snapshot(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_options_from_preset() {
        assert_eq!(ExportOptions::from(AxisPreset::Identity).axis_remap, Mat4::IDENTITY);
        assert_eq!(ExportOptions::default().axis_remap, Y_UP_FROM_Z_UP);
    }
}
