//! Typed record payloads
//!
//! Every record kind has a small payload type implementing [`RecordPayload`].
//! Payloads only know how to lay themselves out as bytes; framing (the tag
//! byte) is added by [`RecordWriter`](super::RecordWriter).

use super::record::{RecordTag, TMD_MAGIC, TMD_VERSION_MAJOR, TMD_VERSION_MINOR};

/// 4×4 matrix flattened in row-major order (`m[row * 4 + col]`)
pub type RowMajorMatrix = [f32; 16];

/// Trait for record payloads.
///
/// `encode` appends the payload bytes to `out` without the tag byte.
/// Payloads never validate their contents: a string with an interior NUL
/// would silently change the record boundary, so callers must reject such
/// names before encoding.
pub trait RecordPayload {
    /// Tag this payload is written under
    const TAG: RecordTag;

    /// Append the payload bytes.
    fn encode(&self, out: &mut Vec<u8>);

    /// Number of bytes `encode` appends.
    fn encoded_len(&self) -> usize;
}

fn push_cstr(out: &mut Vec<u8>, s: &str) {
    debug_assert!(!s.contains('\0'), "interior NUL in record string {s:?}");
    out.extend_from_slice(s.as_bytes());
    out.push(0);
}

fn push_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// `done` - terminates the stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Done;

impl RecordPayload for Done {
    const TAG: RecordTag = RecordTag::Done;

    fn encode(&self, _out: &mut Vec<u8>) {}

    fn encoded_len(&self) -> usize {
        0
    }
}

/// `version` - magic number and format version (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub magic: u32,
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const SIZE: usize = 6;

    /// The version this crate writes
    pub const CURRENT: Version = Version {
        magic: TMD_MAGIC,
        major: TMD_VERSION_MAJOR,
        minor: TMD_VERSION_MINOR,
    };

    /// Write payload to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4] = self.major;
        bytes[5] = self.minor;
        bytes
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl RecordPayload for Version {
    const TAG: RecordTag = RecordTag::Version;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }

    fn encoded_len(&self) -> usize {
        Self::SIZE
    }
}

/// `vertexAttrib` - names the attribute array that follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttrib<'a> {
    pub name: &'a str,
}

impl RecordPayload for VertexAttrib<'_> {
    const TAG: RecordTag = RecordTag::VertexAttrib;

    fn encode(&self, out: &mut Vec<u8>) {
        push_cstr(out, self.name);
    }

    fn encoded_len(&self) -> usize {
        self.name.len() + 1
    }
}

/// `vertex` - one 4-component attribute value (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex(pub [f32; 4]);

impl Vertex {
    pub const SIZE: usize = 16;

    /// Write payload to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        for (chunk, v) in bytes.chunks_exact_mut(4).zip(self.0) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        bytes
    }
}

impl RecordPayload for Vertex {
    const TAG: RecordTag = RecordTag::Vertex;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }

    fn encoded_len(&self) -> usize {
        Self::SIZE
    }
}

/// `newBinding` - starts the triangles of one material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewBinding<'a> {
    pub material: &'a str,
}

impl RecordPayload for NewBinding<'_> {
    const TAG: RecordTag = RecordTag::NewBinding;

    fn encode(&self, out: &mut Vec<u8>) {
        push_cstr(out, self.material);
    }

    fn encoded_len(&self) -> usize {
        self.material.len() + 1
    }
}

/// `triangle` - three 1-based vertex indices (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle(pub [u32; 3]);

impl Triangle {
    pub const SIZE: usize = 12;

    /// Write payload to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        for (chunk, i) in bytes.chunks_exact_mut(4).zip(self.0) {
            chunk.copy_from_slice(&i.to_le_bytes());
        }
        bytes
    }
}

impl RecordPayload for Triangle {
    const TAG: RecordTag = RecordTag::Triangle;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }

    fn encoded_len(&self) -> usize {
        Self::SIZE
    }
}

/// `newBone` - bone length followed by its bind matrix (68 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewBone {
    pub length: f32,
    pub matrix: RowMajorMatrix,
}

impl NewBone {
    pub const SIZE: usize = 68;
}

impl RecordPayload for NewBone {
    const TAG: RecordTag = RecordTag::NewBone;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.length.to_le_bytes());
        push_f32s(out, &self.matrix);
    }

    fn encoded_len(&self) -> usize {
        Self::SIZE
    }
}

/// `parentBone` - links a child bone to its parent (8 bytes)
///
/// Both indices are 1-based export indices of bones already defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentBone {
    pub child: u32,
    pub parent: u32,
}

impl ParentBone {
    pub const SIZE: usize = 8;

    /// Write payload to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.child.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.parent.to_le_bytes());
        bytes
    }
}

impl RecordPayload for ParentBone {
    const TAG: RecordTag = RecordTag::ParentBone;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
    }

    fn encoded_len(&self) -> usize {
        Self::SIZE
    }
}

/// `nameBone` - bone index followed by its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameBone<'a> {
    pub bone: u32,
    pub name: &'a str,
}

impl RecordPayload for NameBone<'_> {
    const TAG: RecordTag = RecordTag::NameBone;

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.bone.to_le_bytes());
        push_cstr(out, self.name);
    }

    fn encoded_len(&self) -> usize {
        4 + self.name.len() + 1
    }
}

/// `newAction` - action name followed by its frame count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAction<'a> {
    pub name: &'a str,
    pub frame_count: u32,
}

impl RecordPayload for NewAction<'_> {
    const TAG: RecordTag = RecordTag::NewAction;

    fn encode(&self, out: &mut Vec<u8>) {
        push_cstr(out, self.name);
        out.extend_from_slice(&self.frame_count.to_le_bytes());
    }

    fn encoded_len(&self) -> usize {
        self.name.len() + 1 + 4
    }
}

/// `newCurve` - 1-based index of the bone the following samples drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCurve {
    pub bone: u8,
}

impl RecordPayload for NewCurve {
    const TAG: RecordTag = RecordTag::NewCurve;

    fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.bone);
    }

    fn encoded_len(&self) -> usize {
        1
    }
}

/// `curveSample` - one frame's pose matrix (64 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    pub matrix: RowMajorMatrix,
}

impl CurveSample {
    pub const SIZE: usize = 64;
}

impl RecordPayload for CurveSample {
    const TAG: RecordTag = RecordTag::CurveSample;

    fn encode(&self, out: &mut Vec<u8>) {
        push_f32s(out, &self.matrix);
    }

    fn encoded_len(&self) -> usize {
        Self::SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<P: RecordPayload>(payload: &P) -> Vec<u8> {
        let mut out = Vec::new();
        payload.encode(&mut out);
        assert_eq!(out.len(), payload.encoded_len(), "encoded_len mismatch");
        out
    }

    #[test]
    fn test_version_layout() {
        let bytes = encoded(&Version::CURRENT);
        assert_eq!(bytes, [0x70, 0x07, 0x77, 0xCA, 1, 1]);
    }

    #[test]
    fn test_done_is_empty() {
        assert!(encoded(&Done).is_empty());
    }

    #[test]
    fn test_string_payloads_are_nul_terminated() {
        assert_eq!(encoded(&VertexAttrib { name: "texCo" }), b"texCo\0");
        assert_eq!(encoded(&NewBinding { material: "Mat" }), b"Mat\0");
        assert_eq!(encoded(&NewBinding { material: "" }), b"\0");
    }

    #[test]
    fn test_string_payloads_are_utf8() {
        let bytes = encoded(&NewBinding { material: "Stahl-ä" });
        assert_eq!(&bytes[..bytes.len() - 1], "Stahl-ä".as_bytes());
        assert_eq!(bytes.last(), Some(&0));
    }

    #[test]
    fn test_vertex_layout() {
        let bytes = encoded(&Vertex([1.0, -2.0, 0.5, 0.0]));
        assert_eq!(bytes.len(), Vertex::SIZE);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &(-2.0f32).to_le_bytes());
        assert_eq!(&bytes[8..12], &0.5f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &0.0f32.to_le_bytes());
    }

    #[test]
    fn test_triangle_layout() {
        let bytes = encoded(&Triangle([1, 2, 0x0102_0304]));
        assert_eq!(bytes, [1, 0, 0, 0, 2, 0, 0, 0, 4, 3, 2, 1]);
    }

    #[test]
    fn test_new_bone_layout() {
        let mut matrix = [0.0f32; 16];
        matrix[3] = 7.0;
        let bytes = encoded(&NewBone {
            length: 2.5,
            matrix,
        });
        assert_eq!(bytes.len(), NewBone::SIZE);
        assert_eq!(&bytes[0..4], &2.5f32.to_le_bytes());
        // Row 0, column 3 is the fourth matrix float, after the length
        assert_eq!(&bytes[16..20], &7.0f32.to_le_bytes());
    }

    #[test]
    fn test_parent_and_name_bone_layout() {
        assert_eq!(
            encoded(&ParentBone {
                child: 2,
                parent: 1
            }),
            [2, 0, 0, 0, 1, 0, 0, 0]
        );
        assert_eq!(
            encoded(&NameBone {
                bone: 3,
                name: "Arm"
            }),
            [3, 0, 0, 0, b'A', b'r', b'm', 0]
        );
    }

    #[test]
    fn test_action_layout_puts_count_after_name() {
        let bytes = encoded(&NewAction {
            name: "Walk",
            frame_count: 24,
        });
        assert_eq!(bytes, [b'W', b'a', b'l', b'k', 0, 24, 0, 0, 0]);
    }

    #[test]
    fn test_curve_layout() {
        assert_eq!(encoded(&NewCurve { bone: 2 }), [2]);
        let sample = CurveSample {
            matrix: std::array::from_fn(|i| i as f32),
        };
        let bytes = encoded(&sample);
        assert_eq!(bytes.len(), CurveSample::SIZE);
        assert_eq!(&bytes[60..64], &15.0f32.to_le_bytes());
    }
}
