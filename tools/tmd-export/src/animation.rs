//! Animation baking (actions -> per-bone sample matrices)
//!
//! Every action is played back from the rest pose. For each integer frame in
//! `[start, end)` all pose channels are evaluated and written into the pose
//! state of their bone, then every bone touched by the action gets one sample
//! `space * T(head) * M * basis`, where `basis = T(location) * R * S(scale)`.

use glam::{EulerRot, Mat4, Quat, Vec3};
use thiserror::Error;

use crate::scene::{ActionSnapshot, FCurveSnapshot, RotationMode};
use crate::skeleton::BakedSkeleton;

/// Curve headers store the bone index in one byte
pub const MAX_CURVE_BONE: u32 = u8::MAX as u32;

const POSE_PREFIX: &str = "pose.";
const BONE_PREFIX: &str = "pose.bones[\"";
const BONE_SUFFIX: &str = "\"].";

/// Bone property a pose channel can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseProperty {
    Location,
    /// Components are `w, x, y, z`
    RotationQuaternion,
    RotationEuler,
    Scale,
}

impl PoseProperty {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "location" => Some(PoseProperty::Location),
            "rotation_quaternion" => Some(PoseProperty::RotationQuaternion),
            "rotation_euler" => Some(PoseProperty::RotationEuler),
            "scale" => Some(PoseProperty::Scale),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PoseProperty::Location => "location",
            PoseProperty::RotationQuaternion => "rotation_quaternion",
            PoseProperty::RotationEuler => "rotation_euler",
            PoseProperty::Scale => "scale",
        }
    }

    pub fn components(self) -> usize {
        match self {
            PoseProperty::RotationQuaternion => 4,
            _ => 3,
        }
    }
}

/// Why a pose channel could not be bound to the skeleton
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("path is not of the form pose.bones[\"<bone>\"].<property>")]
    Malformed,

    #[error("bone '{0}' is not part of the skeleton")]
    UnknownBone(String),

    #[error("'{0}' is not an animatable pose property")]
    UnknownProperty(String),

    #[error("component {index} is out of range for {property}")]
    ComponentOutOfRange {
        property: &'static str,
        index: usize,
    },
}

/// Split a pose data path into bone name and property name.
///
/// Returns `Ok(None)` for paths outside the pose; those belong to other
/// animation targets and are ignored without a warning.
pub fn parse_pose_path(path: &str) -> Result<Option<(String, &str)>, ChannelError> {
    if !path.starts_with(POSE_PREFIX) {
        return Ok(None);
    }
    let rest = path.strip_prefix(BONE_PREFIX).ok_or(ChannelError::Malformed)?;
    let split = rest.rfind(BONE_SUFFIX).ok_or(ChannelError::Malformed)?;
    let (quoted, property) = (&rest[..split], &rest[split + BONE_SUFFIX.len()..]);
    if property.is_empty() {
        return Err(ChannelError::Malformed);
    }
    let bone = quoted.replace("\\\"", "\"").replace("\\\\", "\\");
    Ok(Some((bone, property)))
}

/// A channel resolved against the skeleton
#[derive(Debug, Clone, Copy)]
struct PoseChannel<'a> {
    /// Position in [`BakedSkeleton::bones`]
    slot: usize,
    property: PoseProperty,
    component: usize,
    curve: &'a FCurveSnapshot,
}

fn resolve_channel<'a>(
    fcurve: &'a FCurveSnapshot,
    skeleton: &BakedSkeleton,
) -> Result<Option<PoseChannel<'a>>, ChannelError> {
    let Some((bone, property_name)) = parse_pose_path(&fcurve.data_path)? else {
        return Ok(None);
    };
    let target = skeleton
        .find(&bone)
        .ok_or_else(|| ChannelError::UnknownBone(bone.clone()))?;
    let property = PoseProperty::from_name(property_name)
        .ok_or_else(|| ChannelError::UnknownProperty(property_name.to_string()))?;
    if fcurve.array_index >= property.components() {
        return Err(ChannelError::ComponentOutOfRange {
            property: property.name(),
            index: fcurve.array_index,
        });
    }
    Ok(Some(PoseChannel {
        slot: target.index as usize - 1,
        property,
        component: fcurve.array_index,
        curve: fcurve,
    }))
}

/// Number of channels of an action that target the pose
pub fn pose_channel_count(action: &ActionSnapshot) -> usize {
    action
        .fcurves
        .iter()
        .filter(|c| c.data_path.starts_with(POSE_PREFIX))
        .count()
}

/// Animated local transform of one bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseState {
    pub location: Vec3,
    /// `w, x, y, z`
    pub rotation_quaternion: [f32; 4],
    pub rotation_euler: Vec3,
    pub scale: Vec3,
}

impl Default for PoseState {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation_quaternion: [1.0, 0.0, 0.0, 0.0],
            rotation_euler: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl PoseState {
    /// Overwrite one component of one property
    pub fn set(&mut self, property: PoseProperty, component: usize, value: f32) {
        match property {
            PoseProperty::Location => self.location[component] = value,
            PoseProperty::RotationQuaternion => self.rotation_quaternion[component] = value,
            PoseProperty::RotationEuler => self.rotation_euler[component] = value,
            PoseProperty::Scale => self.scale[component] = value,
        }
    }

    /// Rotation under the bone's rotation mode
    pub fn rotation(&self, mode: RotationMode) -> Quat {
        let [x, y, z] = self.rotation_euler.to_array();
        match mode {
            RotationMode::Quaternion => {
                let [w, qx, qy, qz] = self.rotation_quaternion;
                let q = Quat::from_xyzw(qx, qy, qz, w);
                let length = q.length();
                if length > 0.0 { q / length } else { Quat::IDENTITY }
            }
            // Intrinsic order is the reverse of the order axes are applied in
            RotationMode::Xyz => Quat::from_euler(EulerRot::ZYX, z, y, x),
            RotationMode::Xzy => Quat::from_euler(EulerRot::YZX, y, z, x),
            RotationMode::Yxz => Quat::from_euler(EulerRot::ZXY, z, x, y),
            RotationMode::Yzx => Quat::from_euler(EulerRot::XZY, x, z, y),
            RotationMode::Zxy => Quat::from_euler(EulerRot::YXZ, y, x, z),
            RotationMode::Zyx => Quat::from_euler(EulerRot::XYZ, x, y, z),
        }
    }

    /// `T(location) * R * S(scale)`
    pub fn basis(&self, mode: RotationMode) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation(mode), self.location)
    }
}

/// Samples of one bone, one per frame
#[derive(Debug, Clone, PartialEq)]
pub struct BakedCurve {
    /// 1-based export index of the bone
    pub bone: u8,
    pub samples: Vec<Mat4>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BakedAction {
    pub name: String,
    pub frame_count: u32,
    /// Ascending bone index
    pub curves: Vec<BakedCurve>,
}

/// Bake one action against a skeleton.
///
/// Returns `None` when the action produces no curve: wrong datablock type, no
/// resolvable pose channel, or an empty frame range.
pub fn bake_action(action: &ActionSnapshot, skeleton: &BakedSkeleton) -> Option<BakedAction> {
    if !action.id_root.can_drive_pose() {
        tracing::debug!("Skipping action '{}': not a pose action", action.name);
        return None;
    }

    let mut channels = Vec::new();
    for fcurve in &action.fcurves {
        match resolve_channel(fcurve, skeleton) {
            Ok(Some(channel)) if channel.curve.keyframes.is_empty() => {
                tracing::debug!(
                    "Action '{}': channel {}[{}] has no keyframes",
                    action.name,
                    fcurve.data_path,
                    fcurve.array_index
                );
            }
            Ok(Some(channel)) => channels.push(channel),
            Ok(None) => {}
            Err(e) => tracing::warn!(
                "Action '{}': skipping channel {}[{}]: {}",
                action.name,
                fcurve.data_path,
                fcurve.array_index,
                e
            ),
        }
    }

    let bones = skeleton.bones();
    let mut touched = vec![false; bones.len()];
    for channel in &channels {
        touched[channel.slot] = true;
    }
    let mut targets = Vec::new();
    for (slot, bone) in bones.iter().enumerate() {
        if !touched[slot] {
            continue;
        }
        if bone.index > MAX_CURVE_BONE {
            tracing::warn!(
                "Action '{}': bone '{}' has index {}, curves can only address bones up to {}",
                action.name,
                bone.name,
                bone.index,
                MAX_CURVE_BONE
            );
            continue;
        }
        targets.push(slot);
    }

    let (start, end) = action.frame_bounds();
    let frame_count = action.frame_count();
    if targets.is_empty() || frame_count == 0 {
        tracing::debug!("Skipping action '{}': nothing to bake", action.name);
        return None;
    }

    let mut poses = vec![PoseState::default(); bones.len()];
    let mut samples: Vec<Vec<Mat4>> = targets
        .iter()
        .map(|_| Vec::with_capacity(frame_count as usize))
        .collect();

    for frame in start..end {
        for channel in &channels {
            if let Some(value) = channel.curve.evaluate(frame as f32) {
                poses[channel.slot].set(channel.property, channel.component, value);
            }
        }
        for (column, &slot) in samples.iter_mut().zip(&targets) {
            let bone = &bones[slot];
            column.push(bone.sample(poses[slot].basis(bone.rotation_mode)));
        }
    }

    let curves = targets
        .iter()
        .zip(samples)
        .map(|(&slot, samples)| BakedCurve {
            bone: bones[slot].index as u8,
            samples,
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        "Baked action '{}': {} frames, {} curves",
        action.name,
        frame_count,
        curves.len()
    );

    Some(BakedAction {
        name: action.name.clone(),
        frame_count,
        curves,
    })
}

/// Bake every action that yields at least one curve, in snapshot order
pub fn bake_actions(actions: &[ActionSnapshot], skeleton: &BakedSkeleton) -> Vec<BakedAction> {
    actions
        .iter()
        .filter_map(|action| bake_action(action, skeleton))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{
        ArmatureSnapshot, BoneSnapshot, IdRoot, Interpolation, Keyframe, identity_rows,
    };
    use std::f32::consts::FRAC_PI_2;

    fn bone(name: &str, parent: Option<usize>, head: [f32; 3], mode: RotationMode) -> BoneSnapshot {
        BoneSnapshot {
            name: name.to_string(),
            parent,
            head,
            matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            length: 1.0,
            rotation_mode: mode,
        }
    }

    fn skeleton() -> BakedSkeleton {
        let armature = ArmatureSnapshot {
            world: identity_rows(),
            bones: vec![
                bone("A", None, [0.0, 0.0, 0.0], RotationMode::Quaternion),
                bone("B", Some(0), [0.0, 1.0, 0.0], RotationMode::Xyz),
            ],
        };
        BakedSkeleton::bake(&armature, Mat4::IDENTITY).unwrap()
    }

    fn channel(path: &str, index: usize, keys: &[(f32, f32)]) -> FCurveSnapshot {
        FCurveSnapshot {
            data_path: path.to_string(),
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

    fn action(name: &str, fcurves: Vec<FCurveSnapshot>) -> ActionSnapshot {
        ActionSnapshot {
            name: name.to_string(),
            id_root: IdRoot::Object,
            frame_range: [0.0, 4.0],
            fcurves,
        }
    }

    #[test]
    fn test_parse_pose_path() {
        assert_eq!(
            parse_pose_path("pose.bones[\"Arm.L\"].location"),
            Ok(Some(("Arm.L".to_string(), "location")))
        );
        assert_eq!(
            parse_pose_path("pose.bones[\"a\\\"b\"].scale"),
            Ok(Some(("a\"b".to_string(), "scale")))
        );
        assert_eq!(parse_pose_path("location"), Ok(None));
        assert_eq!(parse_pose_path("pose.ik_solver"), Err(ChannelError::Malformed));
        assert_eq!(parse_pose_path("pose.bones[\"A\"]."), Err(ChannelError::Malformed));
    }

    #[test]
    fn test_only_touched_bones_get_curves() {
        let skeleton = skeleton();
        let act = action(
            "Wave",
            vec![channel("pose.bones[\"B\"].location", 0, &[(0.0, 0.0), (3.0, 3.0)])],
        );
        let baked = bake_action(&act, &skeleton).unwrap();
        assert_eq!(baked.frame_count, 4);
        assert_eq!(baked.curves.len(), 1);
        assert_eq!(baked.curves[0].bone, 2);
        assert_eq!(baked.curves[0].samples.len(), 4);

        // T(head) * T(location)
        let last = baked.curves[0].samples[3];
        assert_eq!(last.w_axis.truncate(), Vec3::new(3.0, 1.0, 0.0));
    }

    #[test]
    fn test_non_pose_actions_are_skipped() {
        let skeleton = skeleton();
        let object_only = action("Move", vec![channel("location", 0, &[(0.0, 1.0)])]);
        assert!(bake_action(&object_only, &skeleton).is_none());

        let mut material = action(
            "Tint",
            vec![channel("pose.bones[\"A\"].location", 0, &[(0.0, 1.0)])],
        );
        material.id_root = IdRoot::Material;
        assert!(bake_action(&material, &skeleton).is_none());

        assert!(bake_actions(&[object_only, material], &skeleton).is_empty());
    }

    #[test]
    fn test_unresolvable_channels_are_skipped() {
        let skeleton = skeleton();
        let act = action(
            "Mixed",
            vec![
                channel("pose.bones[\"Ghost\"].location", 0, &[(0.0, 1.0)]),
                channel("pose.bones[\"A\"].stretch", 0, &[(0.0, 1.0)]),
                channel("pose.bones[\"A\"].location", 5, &[(0.0, 1.0)]),
                channel("pose.bones[\"A\"].scale", 2, &[(0.0, 2.0)]),
            ],
        );
        let baked = bake_action(&act, &skeleton).unwrap();
        assert_eq!(baked.curves.len(), 1);
        assert_eq!(baked.curves[0].bone, 1);
        assert_eq!(
            baked.curves[0].samples[0],
            Mat4::from_scale(Vec3::new(1.0, 1.0, 2.0))
        );
    }

    #[test]
    fn test_channel_without_keys_touches_nothing() {
        let skeleton = skeleton();
        let act = action("Empty", vec![channel("pose.bones[\"A\"].location", 0, &[])]);
        assert!(bake_action(&act, &skeleton).is_none());
    }

    #[test]
    fn test_empty_frame_range_is_skipped() {
        let skeleton = skeleton();
        let mut act = action(
            "Still",
            vec![channel("pose.bones[\"A\"].location", 0, &[(0.0, 1.0)])],
        );
        act.frame_range = [5.0, 5.0];
        assert!(bake_action(&act, &skeleton).is_none());
    }

    #[test]
    fn test_pose_resets_between_actions() {
        let skeleton = skeleton();
        let moves = action(
            "Moves",
            vec![channel("pose.bones[\"A\"].location", 1, &[(0.0, 5.0)])],
        );
        let scales = action(
            "Scales",
            vec![channel("pose.bones[\"A\"].scale", 0, &[(0.0, 2.0)])],
        );
        let baked = bake_actions(&[moves, scales], &skeleton);
        assert_eq!(baked.len(), 2);
        // The second action does not inherit the first one's location
        assert_eq!(
            baked[1].curves[0].samples[0],
            Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0))
        );
    }

    #[test]
    fn test_quaternion_is_normalized() {
        let mut pose = PoseState::default();
        pose.set(PoseProperty::RotationQuaternion, 0, 2.0);
        assert_eq!(pose.rotation(RotationMode::Quaternion), Quat::IDENTITY);

        pose.rotation_quaternion = [0.0; 4];
        assert_eq!(pose.rotation(RotationMode::Quaternion), Quat::IDENTITY);
    }

    #[test]
    fn test_euler_order_applies_first_axis_first() {
        let pose = PoseState {
            rotation_euler: Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_2),
            ..Default::default()
        };
        // X first: Y -> Z, then Z about Z stays Z
        let xyz = pose.rotation(RotationMode::Xyz);
        assert!((xyz * Vec3::Y).abs_diff_eq(Vec3::Z, 1e-6));
        assert!((xyz * Vec3::Z).abs_diff_eq(Vec3::X, 1e-6));

        // Z first: Y -> -X, then X about X stays -X
        let zyx = pose.rotation(RotationMode::Zyx);
        assert!((zyx * Vec3::Y).abs_diff_eq(Vec3::NEG_X, 1e-6));
    }

    #[test]
    fn test_basis_is_translate_rotate_scale() {
        let pose = PoseState {
            location: Vec3::new(1.0, 0.0, 0.0),
            rotation_euler: Vec3::new(0.0, 0.0, FRAC_PI_2),
            scale: Vec3::splat(2.0),
            ..Default::default()
        };
        let basis = pose.basis(RotationMode::Xyz);
        // Scale, then rotate X onto Y, then translate
        let p = basis.transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn test_pose_channel_count() {
        let act = action(
            "Mixed",
            vec![
                channel("location", 0, &[]),
                channel("pose.bones[\"A\"].location", 0, &[]),
                channel("pose.bones[\"B\"].scale", 1, &[]),
            ],
        );
        assert_eq!(pose_channel_count(&act), 2);
    }
}
