//! Host scene snapshots
//!
//! The content-creation tool that drives an export owns the real scene graph.
//! What reaches the exporter is an immutable value copy of one object: its
//! mesh, the armature deforming it (if any) and the actions that can animate
//! that armature. Snapshots are plain serde types so hosts can hand them over
//! as JSON.

mod action;
mod armature;
mod mesh;

pub use action::{ActionSnapshot, FCurveSnapshot, IdRoot, Interpolation, Keyframe};
pub use armature::{ArmatureSnapshot, BoneSnapshot, RotationMode};
pub use mesh::{GroupWeight, LoopSnapshot, MeshSnapshot, PolygonSnapshot};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::SnapshotError;

/// Row-major 4×4 identity, the default for world matrices
pub(crate) fn identity_rows() -> [[f32; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Everything the exporter needs from the host for one export call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub object: ObjectSnapshot,
    pub mesh: MeshSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armature: Option<ArmatureSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionSnapshot>,
}

/// The exported object itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub name: String,
    pub kind: ObjectKind,
    /// Object-to-world transform, row-major
    #[serde(default = "identity_rows")]
    pub world: [[f32; 4]; 4],
}

/// Host object type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Mesh,
    Curve,
    Surface,
    Font,
    Meta,
    Armature,
    Camera,
    Light,
    Empty,
    #[serde(other)]
    Other,
}

impl ObjectKind {
    /// Whether the host can turn objects of this kind into a triangle mesh
    pub fn is_exportable(self) -> bool {
        matches!(
            self,
            ObjectKind::Mesh
                | ObjectKind::Curve
                | ObjectKind::Surface
                | ObjectKind::Font
                | ObjectKind::Meta
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Mesh => "mesh",
            ObjectKind::Curve => "curve",
            ObjectKind::Surface => "surface",
            ObjectKind::Font => "font",
            ObjectKind::Meta => "meta",
            ObjectKind::Armature => "armature",
            ObjectKind::Camera => "camera",
            ObjectKind::Light => "light",
            ObjectKind::Empty => "empty",
            ObjectKind::Other => "other",
        };
        f.write_str(name)
    }
}

impl SceneSnapshot {
    /// Check every cross-reference in the snapshot.
    ///
    /// Runs before anything is written, so a failing snapshot never produces
    /// a partial file.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        self.mesh.validate()?;
        if let Some(armature) = &self.armature {
            armature.validate()?;
        }
        for action in &self.actions {
            action.validate()?;
        }
        Ok(())
    }
}

/// Reject names that would break the NUL-terminated string encoding
pub(crate) fn check_name(what: &'static str, name: &str) -> Result<(), SnapshotError> {
    if name.contains('\0') {
        return Err(SnapshotError::NulInName {
            what,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Load a scene snapshot from a JSON file
pub fn load_scene(path: &Path) -> Result<SceneSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene: {:?}", path))?;
    let scene: SceneSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse scene: {:?}", path))?;
    Ok(scene)
}
