//! tmd-export library
//!
//! Turns host scene snapshots (mesh, armature, actions) into TMD record
//! streams. Used by the `tmd-export` CLI and by host-side plugins that link
//! the exporter directly.

pub mod animation;
pub mod error;
pub mod export;
pub mod formats;
pub mod manifest;
pub mod mesh;
pub mod scene;
pub mod skeleton;
pub mod space;

// Re-export format constants from tmd-common
pub use tmd_common::{TMD_EXT, TMD_MAGIC, TMD_VERSION_MAJOR, TMD_VERSION_MINOR};

// Re-export the export entry points
pub use error::{ExportError, SnapshotError};
pub use export::{ExportOptions, ExportPlan, ExportSummary, Section, export_scene, export_to_file};

// Re-export snapshot types
pub use scene::{SceneSnapshot, load_scene};
pub use space::{AxisPreset, Y_UP_FROM_Z_UP};
