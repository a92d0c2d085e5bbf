//! Record tags and format constants

/// Magic number carried by the `version` record
pub const TMD_MAGIC: u32 = 0xCA77_0770;

/// Format major version
pub const TMD_VERSION_MAJOR: u8 = 1;

/// Format minor version
pub const TMD_VERSION_MINOR: u8 = 1;

/// Tag byte that starts every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordTag {
    /// End of stream, empty payload
    Done = 0x00,
    /// Magic + version, always the first record
    Version = 0x01,
    /// Starts a vertex attribute array
    VertexAttrib = 0x10,
    /// One element of the current vertex attribute array
    Vertex = 0x11,
    /// Starts the triangle list of a material
    NewBinding = 0x20,
    /// One triangle of the current binding
    Triangle = 0x21,
    /// Bone length + bind matrix
    NewBone = 0x30,
    /// Child → parent link between two defined bones
    ParentBone = 0x31,
    /// Bone name
    NameBone = 0x32,
    /// Starts an action
    NewAction = 0x40,
    /// Starts the sample list of one bone within the current action
    NewCurve = 0x41,
    /// One per-frame pose matrix of the current curve
    CurveSample = 0x42,
    /// Reserved, never written
    PlaybackData = 0x43,
}

impl RecordTag {
    /// All tags in ascending byte order
    pub const ALL: [RecordTag; 13] = [
        RecordTag::Done,
        RecordTag::Version,
        RecordTag::VertexAttrib,
        RecordTag::Vertex,
        RecordTag::NewBinding,
        RecordTag::Triangle,
        RecordTag::NewBone,
        RecordTag::ParentBone,
        RecordTag::NameBone,
        RecordTag::NewAction,
        RecordTag::NewCurve,
        RecordTag::CurveSample,
        RecordTag::PlaybackData,
    ];

    /// Tag byte as written to the stream
    #[inline]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Look up a tag from its byte value
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.byte() == byte)
    }

    /// Name used for this record in the format documentation
    pub const fn name(self) -> &'static str {
        match self {
            RecordTag::Done => "done",
            RecordTag::Version => "version",
            RecordTag::VertexAttrib => "vertexAttrib",
            RecordTag::Vertex => "vertex",
            RecordTag::NewBinding => "newBinding",
            RecordTag::Triangle => "triangle",
            RecordTag::NewBone => "newBone",
            RecordTag::ParentBone => "parentBone",
            RecordTag::NameBone => "nameBone",
            RecordTag::NewAction => "newAction",
            RecordTag::NewCurve => "newCurve",
            RecordTag::CurveSample => "curveSample",
            RecordTag::PlaybackData => "playbackData",
        }
    }
}

impl std::fmt::Display for RecordTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:02x})", self.name(), self.byte())
    }
}
