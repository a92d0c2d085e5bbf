//! Action snapshot and channel evaluation

use serde::{Deserialize, Serialize};

use super::check_name;
use crate::error::SnapshotError;

/// A named set of animation channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSnapshot {
    pub name: String,
    /// Kind of datablock the action was authored for
    #[serde(default)]
    pub id_root: IdRoot,
    /// Authored `[start, end]` frame range
    pub frame_range: [f32; 2],
    #[serde(default)]
    pub fcurves: Vec<FCurveSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdRoot {
    #[default]
    Object,
    Armature,
    Mesh,
    Material,
    #[serde(other)]
    Other,
}

impl IdRoot {
    /// Actions of these roots may carry pose channels
    pub fn can_drive_pose(self) -> bool {
        matches!(self, IdRoot::Object | IdRoot::Armature)
    }
}

/// One animated scalar, addressed by data path and component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FCurveSnapshot {
    pub data_path: String,
    #[serde(default)]
    pub array_index: usize,
    pub keyframes: Vec<Keyframe>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: f32,
    pub value: f32,
    /// Interpolation towards the next keyframe
    #[serde(default)]
    pub interpolation: Interpolation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Constant,
    Linear,
    /// Eased segment, evaluated as a cubic with flat handles
    #[default]
    Bezier,
}

impl FCurveSnapshot {
    /// Evaluate the curve at `frame`.
    ///
    /// Holds the first/last value outside the keyed range. Returns `None` for
    /// a curve without keyframes.
    pub fn evaluate(&self, frame: f32) -> Option<f32> {
        let keys = &self.keyframes;
        let first = keys.first()?;
        let last = keys.last()?;

        // Index of the first key strictly after `frame`
        let next = keys.partition_point(|k| k.frame <= frame);
        if next == 0 {
            return Some(first.value);
        }
        if next >= keys.len() {
            return Some(last.value);
        }

        let left = keys[next - 1];
        let right = keys[next];

        let span = right.frame - left.frame;
        if span <= 0.0 {
            return Some(right.value);
        }
        let t = (frame - left.frame) / span;

        let eased = match left.interpolation {
            Interpolation::Constant => return Some(left.value),
            Interpolation::Linear => t,
            Interpolation::Bezier => t * t * (3.0 - 2.0 * t),
        };
        Some(left.value + (right.value - left.value) * eased)
    }
}

impl ActionSnapshot {
    /// Authored frame range truncated to whole frames, end exclusive
    pub fn frame_bounds(&self) -> (i32, i32) {
        (self.frame_range[0] as i32, self.frame_range[1] as i32)
    }

    /// Number of frames baked for this action
    pub fn frame_count(&self) -> u32 {
        let (start, end) = self.frame_bounds();
        (end as i64 - start as i64).max(0) as u32
    }

    pub(crate) fn validate(&self) -> Result<(), SnapshotError> {
        check_name("action", &self.name)?;
        for fcurve in &self.fcurves {
            let sorted = fcurve
                .keyframes
                .windows(2)
                .all(|pair| pair[0].frame <= pair[1].frame);
            if !sorted {
                return Err(SnapshotError::UnsortedKeyframes {
                    action: self.name.clone(),
                    data_path: fcurve.data_path.clone(),
                    array_index: fcurve.array_index,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(frame: f32, value: f32, interpolation: Interpolation) -> Keyframe {
        Keyframe {
            frame,
            value,
            interpolation,
        }
    }

    fn curve(keyframes: Vec<Keyframe>) -> FCurveSnapshot {
        FCurveSnapshot {
            data_path: "pose.bones[\"B\"].location".to_string(),
            array_index: 0,
            keyframes,
        }
    }

    #[test]
    fn test_empty_curve_has_no_value() {
        assert_eq!(curve(vec![]).evaluate(3.0), None);
    }

    #[test]
    fn test_constant_extrapolation() {
        let c = curve(vec![
            key(10.0, 1.0, Interpolation::Linear),
            key(20.0, 3.0, Interpolation::Linear),
        ]);
        assert_eq!(c.evaluate(0.0), Some(1.0));
        assert_eq!(c.evaluate(10.0), Some(1.0));
        assert_eq!(c.evaluate(20.0), Some(3.0));
        assert_eq!(c.evaluate(99.0), Some(3.0));
    }

    #[test]
    fn test_linear_segment() {
        let c = curve(vec![
            key(0.0, 0.0, Interpolation::Linear),
            key(4.0, 8.0, Interpolation::Linear),
        ]);
        assert_eq!(c.evaluate(1.0), Some(2.0));
        assert_eq!(c.evaluate(3.0), Some(6.0));
    }

    #[test]
    fn test_constant_segment_holds_left_key() {
        let c = curve(vec![
            key(0.0, 5.0, Interpolation::Constant),
            key(4.0, 8.0, Interpolation::Linear),
        ]);
        assert_eq!(c.evaluate(3.9), Some(5.0));
        assert_eq!(c.evaluate(4.0), Some(8.0));
    }

    #[test]
    fn test_bezier_segment_is_eased() {
        let c = curve(vec![
            key(0.0, 0.0, Interpolation::Bezier),
            key(4.0, 1.0, Interpolation::Bezier),
        ]);
        assert_eq!(c.evaluate(2.0), Some(0.5));
        let early = c.evaluate(1.0).unwrap();
        assert!(early > 0.0 && early < 0.25, "eased start, got {early}");
    }

    #[test]
    fn test_frame_bounds_truncate() {
        let action = ActionSnapshot {
            name: "Walk".to_string(),
            id_root: IdRoot::Object,
            frame_range: [1.0, 24.9],
            fcurves: vec![],
        };
        assert_eq!(action.frame_bounds(), (1, 24));
        assert_eq!(action.frame_count(), 23);

        let reversed = ActionSnapshot {
            frame_range: [10.0, 2.0],
            ..action
        };
        assert_eq!(reversed.frame_count(), 0);
    }

    #[test]
    fn test_unsorted_keyframes_rejected() {
        let action = ActionSnapshot {
            name: "Walk".to_string(),
            id_root: IdRoot::Armature,
            frame_range: [0.0, 10.0],
            fcurves: vec![curve(vec![
                key(5.0, 0.0, Interpolation::Linear),
                key(1.0, 0.0, Interpolation::Linear),
            ])],
        };
        assert!(matches!(
            action.validate(),
            Err(SnapshotError::UnsortedKeyframes { .. })
        ));
    }

    #[test]
    fn test_id_root() {
        assert!(IdRoot::Object.can_drive_pose());
        assert!(IdRoot::Armature.can_drive_pose());
        assert!(!IdRoot::Material.can_drive_pose());
        let root: IdRoot = serde_json::from_str("\"world\"").unwrap();
        assert_eq!(root, IdRoot::Other);
    }
}
