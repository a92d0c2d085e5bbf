//! Error types for TMD export

use thiserror::Error;

use crate::scene::ObjectKind;

/// Result type alias using ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that abort an export.
///
/// Everything except [`ExportError::Io`] is detected before the first byte
/// is written, so those failures never leave a file behind.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The active object is not a geometry type.
    #[error("Object '{name}' of type {kind} cannot be exported")]
    UnsupportedObject { name: String, kind: ObjectKind },

    /// The snapshot handed over by the host is inconsistent.
    #[error("Invalid scene snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Writing the output failed; the file is incomplete.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inconsistencies in a host snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("loop {loop_index} references vertex {vertex}, mesh has {vertex_count} vertices")]
    LoopVertexOutOfRange {
        loop_index: usize,
        vertex: u32,
        vertex_count: usize,
    },

    #[error("polygon {polygon} spans loops {loop_start}..{loop_end}, mesh has {loop_count} loops")]
    PolygonLoopsOutOfRange {
        polygon: usize,
        loop_start: u32,
        loop_end: u64,
        loop_count: usize,
    },

    #[error("UV layer has {found} entries, mesh has {expected} loops")]
    UvLayerLength { expected: usize, found: usize },

    #[error("vertex weights cover {found} vertices, mesh has {expected}")]
    VertexWeightsLength { expected: usize, found: usize },

    #[error("vertex {vertex} references vertex group {group}, mesh has {group_count} groups")]
    VertexGroupOutOfRange {
        vertex: usize,
        group: usize,
        group_count: usize,
    },

    #[error("bone '{bone}' has parent {parent}, armature has {bone_count} bones")]
    BoneParentOutOfRange {
        bone: String,
        parent: usize,
        bone_count: usize,
    },

    #[error("bone '{0}' is part of a parent cycle")]
    BoneCycle(String),

    #[error("bone name '{0}' is used more than once")]
    DuplicateBoneName(String),

    #[error("action '{action}': keyframes of '{data_path}'[{array_index}] are not sorted by frame")]
    UnsortedKeyframes {
        action: String,
        data_path: String,
        array_index: usize,
    },

    #[error("{what} name {name:?} contains a NUL byte")]
    NulInName { what: &'static str, name: String },
}
