//! Coordinate-space conversion
//!
//! The exporter never guesses the target convention. The caller picks an
//! axis remap (see [`AxisPreset`]) which is composed with the object's and
//! armature's world matrices and applied uniformly to mesh data, bind poses
//! and baked samples.

use glam::{Mat3, Mat4, Vec3, Vec4};
use std::fmt;
use std::str::FromStr;

/// Z-up, right-handed authoring space to the Y-up space of the renderer
/// (mirrors X, swaps Y and Z).
pub const Y_UP_FROM_Z_UP: Mat4 = Mat4::from_cols(
    Vec4::new(-1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 1.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::W,
);

/// Named axis remaps selectable from the CLI and the manifest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AxisPreset {
    #[default]
    YUp,
    Identity,
}

impl AxisPreset {
    pub fn matrix(self) -> Mat4 {
        match self {
            AxisPreset::YUp => Y_UP_FROM_Z_UP,
            AxisPreset::Identity => Mat4::IDENTITY,
        }
    }
}

impl FromStr for AxisPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "y-up" | "yup" => Ok(AxisPreset::YUp),
            "identity" | "none" => Ok(AxisPreset::Identity),
            other => Err(format!(
                "unknown axis preset '{}' (expected 'y-up' or 'identity')",
                other
            )),
        }
    }
}

impl fmt::Display for AxisPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisPreset::YUp => f.write_str("y-up"),
            AxisPreset::Identity => f.write_str("identity"),
        }
    }
}

/// Build a matrix from row-major rows as they appear in snapshots
#[inline]
pub fn mat4_from_rows(rows: &[[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(rows).transpose()
}

#[inline]
pub fn mat3_from_rows(rows: &[[f32; 3]; 3]) -> Mat3 {
    Mat3::from_cols_array_2d(rows).transpose()
}

/// Flatten a matrix in the row-major order the TMD format stores
#[inline]
pub fn to_row_major(m: &Mat4) -> [f32; 16] {
    m.transpose().to_cols_array()
}

/// A transform into the target space, with its normal matrix cached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSpace {
    matrix: Mat4,
    normal_matrix: Mat3,
}

impl CoordinateSpace {
    pub fn new(matrix: Mat4) -> Self {
        let linear = Mat3::from_mat4(matrix);
        let det = linear.determinant();
        let normal_matrix = if det.abs() > f32::EPSILON {
            linear.inverse().transpose()
        } else {
            tracing::warn!("Degenerate export transform (det = {}), normals use it as-is", det);
            linear
        };
        Self {
            matrix,
            normal_matrix,
        }
    }

    /// `axis_remap * world`
    pub fn from_world(axis_remap: Mat4, world: &[[f32; 4]; 4]) -> Self {
        Self::new(axis_remap * mat4_from_rows(world))
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    #[inline]
    pub fn point(&self, p: Vec3) -> Vec3 {
        self.matrix.transform_point3(p)
    }

    /// Transform a normal and renormalize it
    #[inline]
    pub fn normal(&self, n: Vec3) -> Vec3 {
        (self.normal_matrix * n).normalize_or_zero()
    }
}
