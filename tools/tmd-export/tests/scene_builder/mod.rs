//! Scene snapshots and a record decoder for integration tests.
//!
//! The decoder only exists for tests: it splits a TMD stream back into
//! records so scenarios can assert on record order and payloads.

#![allow(dead_code)]

use tmd_export::scene::{
    ActionSnapshot, ArmatureSnapshot, BoneSnapshot, FCurveSnapshot, GroupWeight, IdRoot,
    Interpolation, Keyframe, LoopSnapshot, MeshSnapshot, ObjectKind, ObjectSnapshot,
    PolygonSnapshot, RotationMode, SceneSnapshot,
};

pub const IDENTITY_ROWS: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// One decoded record
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Done,
    Version { magic: u32, major: u8, minor: u8 },
    VertexAttrib(String),
    Vertex([f32; 4]),
    NewBinding(String),
    Triangle([u32; 3]),
    NewBone { length: f32, matrix: [f32; 16] },
    ParentBone { child: u32, parent: u32 },
    NameBone { bone: u32, name: String },
    NewAction { name: String, frame_count: u32 },
    NewCurve(u8),
    CurveSample([f32; 16]),
}

impl Record {
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Done => "done",
            Record::Version { .. } => "version",
            Record::VertexAttrib(_) => "vertexAttrib",
            Record::Vertex(_) => "vertex",
            Record::NewBinding(_) => "newBinding",
            Record::Triangle(_) => "triangle",
            Record::NewBone { .. } => "newBone",
            Record::ParentBone { .. } => "parentBone",
            Record::NameBone { .. } => "nameBone",
            Record::NewAction { .. } => "newAction",
            Record::NewCurve(_) => "newCurve",
            Record::CurveSample(_) => "curveSample",
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> &'a [u8] {
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        slice
    }

    fn u8(&mut self) -> u8 {
        self.take(1)[0]
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take(4).try_into().unwrap())
    }

    fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take(4).try_into().unwrap())
    }

    fn f32s<const N: usize>(&mut self) -> [f32; N] {
        std::array::from_fn(|_| self.f32())
    }

    fn cstr(&mut self) -> String {
        let rest = &self.bytes[self.pos..];
        let end = rest.iter().position(|&b| b == 0).expect("unterminated string");
        let s = std::str::from_utf8(&rest[..end]).expect("invalid UTF-8").to_string();
        self.pos += end + 1;
        s
    }
}

/// Split a TMD stream into records. Panics on anything malformed.
pub fn decode(bytes: &[u8]) -> Vec<Record> {
    let mut cursor = Cursor { bytes, pos: 0 };
    let mut records = Vec::new();
    while cursor.pos < bytes.len() {
        let record = match cursor.u8() {
            0x00 => Record::Done,
            0x01 => Record::Version {
                magic: cursor.u32(),
                major: cursor.u8(),
                minor: cursor.u8(),
            },
            0x10 => Record::VertexAttrib(cursor.cstr()),
            0x11 => Record::Vertex(cursor.f32s()),
            0x20 => Record::NewBinding(cursor.cstr()),
            0x21 => Record::Triangle([cursor.u32(), cursor.u32(), cursor.u32()]),
            0x30 => Record::NewBone {
                length: cursor.f32(),
                matrix: cursor.f32s(),
            },
            0x31 => Record::ParentBone {
                child: cursor.u32(),
                parent: cursor.u32(),
            },
            0x32 => Record::NameBone {
                bone: cursor.u32(),
                name: cursor.cstr(),
            },
            0x40 => Record::NewAction {
                name: cursor.cstr(),
                frame_count: cursor.u32(),
            },
            0x41 => Record::NewCurve(cursor.u8()),
            0x42 => Record::CurveSample(cursor.f32s()),
            tag => panic!("unexpected tag 0x{:02x} at byte {}", tag, cursor.pos - 1),
        };
        records.push(record);
    }
    records
}

/// Record kinds in stream order
pub fn kinds(records: &[Record]) -> Vec<&'static str> {
    records.iter().map(Record::kind).collect()
}

/// Values of the attribute array with the given name
pub fn attribute(records: &[Record], name: &str) -> Option<Vec<[f32; 4]>> {
    let start = records
        .iter()
        .position(|r| matches!(r, Record::VertexAttrib(n) if n == name))?;
    Some(
        records[start + 1..]
            .iter()
            .map_while(|r| match r {
                Record::Vertex(v) => Some(*v),
                _ => None,
            })
            .collect(),
    )
}

/// Every triangle record in the stream
pub fn triangles(records: &[Record]) -> Vec<[u32; 3]> {
    records
        .iter()
        .filter_map(|r| match r {
            Record::Triangle(t) => Some(*t),
            _ => None,
        })
        .collect()
}

fn corner(vertex: u32, normal: [f32; 3]) -> LoopSnapshot {
    LoopSnapshot { vertex, normal }
}

/// One triangle, three distinct corners, one material, UVs, no armature
pub fn triangle_scene() -> SceneSnapshot {
    SceneSnapshot {
        object: ObjectSnapshot {
            name: "Tri".to_string(),
            kind: ObjectKind::Mesh,
            world: IDENTITY_ROWS,
        },
        mesh: MeshSnapshot {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            loops: vec![
                corner(0, [0.0, 0.0, 1.0]),
                corner(1, [0.0, 0.0, 1.0]),
                corner(2, [0.0, 0.0, 1.0]),
            ],
            uv_layer: Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
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

/// Two bones, `A` (root) and `B` (child of `A`), weighting the triangle
pub fn two_bone_scene() -> SceneSnapshot {
    let mut scene = triangle_scene();
    scene.object.name = "Rig".to_string();
    scene.mesh.vertex_groups = vec!["A".to_string(), "B".to_string()];
    scene.mesh.vertex_weights = vec![
        vec![GroupWeight {
            group: 0,
            weight: 1.0,
        }],
        vec![
            GroupWeight {
                group: 0,
                weight: 0.5,
            },
            GroupWeight {
                group: 1,
                weight: 0.5,
            },
        ],
        vec![GroupWeight {
            group: 1,
            weight: 1.0,
        }],
    ];
    scene.armature = Some(ArmatureSnapshot {
        world: IDENTITY_ROWS,
        bones: vec![
            BoneSnapshot {
                name: "A".to_string(),
                parent: None,
                head: [0.0, 0.0, 0.0],
                matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                length: 1.0,
                rotation_mode: RotationMode::Quaternion,
            },
            BoneSnapshot {
                name: "B".to_string(),
                parent: Some(0),
                head: [0.0, 1.0, 0.0],
                matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                length: 0.5,
                rotation_mode: RotationMode::Xyz,
            },
        ],
    });
    scene
}

/// A linear channel on `pose.bones["<bone>"].<property>[index]`
pub fn pose_channel(
    bone: &str,
    property: &str,
    index: usize,
    keys: &[(f32, f32)],
) -> FCurveSnapshot {
    FCurveSnapshot {
        data_path: format!("pose.bones[\"{}\"].{}", bone, property),
        array_index: index,
        keyframes: keys
            .iter()
            .map(|&(frame, value)| Keyframe {
                frame,
                value,
                interpolation: Interpolation::Linear,
            })
            .collect(),
    }
}

pub fn action(name: &str, frames: [f32; 2], fcurves: Vec<FCurveSnapshot>) -> ActionSnapshot {
    ActionSnapshot {
        name: name.to_string(),
        id_root: IdRoot::Object,
        frame_range: frames,
        fcurves,
    }
}
