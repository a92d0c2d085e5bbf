//! TMD binary model format (.tmd)
//!
//! A TMD file is a forward-only stream of tagged records. Every record is a
//! single tag byte followed immediately by its payload. There is no length
//! prefix and no padding: each payload is either fixed-size or ends with a
//! NUL-terminated UTF-8 string.
//!
//! # Layout
//! ```text
//! tag   name          payload
//! 0x00  done          (empty)
//! 0x01  version       magic u32, major u8, minor u8
//! 0x10  vertexAttrib  name cstr
//! 0x11  vertex        f32 × 4 (x, y, z, w)
//! 0x20  newBinding    material name cstr
//! 0x21  triangle      u32 × 3 vertex indices (1-based)
//! 0x30  newBone       length f32, f32 × 16 row-major matrix
//! 0x31  parentBone    child u32, parent u32
//! 0x32  nameBone      bone u32, name cstr
//! 0x40  newAction     name cstr, frame_count u32
//! 0x41  newCurve      bone u8
//! 0x42  curveSample   f32 × 16 row-major matrix
//! 0x43  playbackData  (reserved)
//! ```
//!
//! All multi-byte numbers are little-endian. A well-formed stream starts with
//! exactly one `version` record and ends with exactly one `done` record; a
//! stream that reaches EOF without `done` is incomplete and must be rejected.

mod payload;
mod record;
mod writer;

pub use payload::*;
pub use record::*;
pub use writer::RecordWriter;

/// File extension for TMD models
pub const TMD_EXT: &str = "tmd";
