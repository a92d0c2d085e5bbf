//! Shared definitions for the TMD model interchange format
//!
//! This crate owns everything that is byte-level about a `.tmd` file and is
//! shared between the exporter (`tmd-export`) and anything else that needs to
//! produce TMD streams.
//!
//! # Modules
//!
//! - [`formats`] - Record tags, typed record payloads and the stream encoder

pub mod formats;

// Re-export commonly used format items
pub use formats::{
    // Constants
    TMD_EXT,
    TMD_MAGIC,
    TMD_VERSION_MAJOR,
    TMD_VERSION_MINOR,
    // Payloads
    CurveSample,
    Done,
    NameBone,
    NewAction,
    NewBinding,
    NewBone,
    NewCurve,
    ParentBone,
    RecordPayload,
    // Tags and encoder
    RecordTag,
    RecordWriter,
    RowMajorMatrix,
    Triangle,
    Version,
    Vertex,
    VertexAttrib,
};
