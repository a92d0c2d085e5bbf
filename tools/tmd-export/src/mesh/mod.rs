//! Geometry flattening (snapshot mesh -> TMD vertex arrays + triangles)

mod flatten;
mod prepare;
mod types;
mod weights;

// Re-export public API
pub use flatten::flatten;
pub use prepare::prepare_mesh;
pub use types::{
    Corner, FIRST_VERTEX_INDEX, FlatVertex, FlattenedMesh, MAX_WEIGHT_GROUPS, MAX_WEIGHTED_BONES,
    MeshTriangle, PreparedMesh, SkinBinding, VertexKey, WEIGHTS_PER_GROUP,
};
pub use weights::{WeightGroups, bone_weights_attrib};
