//! Bone frames and the geometry hosts need to place displayable bones.
//!
//! Poser stores a bone as an origin plus Euler orientation; the bone's length and the
//! direction it should point in are implied by where its children start. The functions
//! here recover that and express it as matrices for a host whose bones point along +Y.

use super::armature::Armature;
use super::bone::{Axis, Bone, RotationOrder};
use super::weight::plane_angle;
use glam::{DMat3, DMat4, DVec3};

/// Children within this many degrees of the twist axis (either direction) count as
/// lying on it.
const COLLINEAR_TOLERANCE_DEG: f64 = 1.0;

/// Rotation for Euler angles in degrees, applied X first, then Y, then Z.
pub(crate) fn euler_xyz(degrees: DVec3) -> DMat3 {
    let r = degrees * (std::f64::consts::PI / 180.0);
    DMat3::from_rotation_z(r.z) * DMat3::from_rotation_y(r.y) * DMat3::from_rotation_x(r.x)
}

pub fn axis_rotation(degrees: f64, axis: Axis) -> DMat3 {
    let angle = degrees.to_radians();
    match axis {
        Axis::X => DMat3::from_rotation_x(angle),
        Axis::Y => DMat3::from_rotation_y(angle),
        Axis::Z => DMat3::from_rotation_z(angle),
    }
}

/// Two axis rotations that carry the host's bone axes onto a bone's declared ones: +Y
/// onto the twist axis, +Z onto the second rotation axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisRemap {
    pub first: (f64, Axis),
    pub second: (f64, Axis),
    /// `-1.0` when the remap sends the third axis to -X (an odd permutation). Not used
    /// by [`Armature::pre_transform`].
    pub sign: f64,
}

impl AxisRemap {
    pub fn for_order(order: RotationOrder) -> Self {
        let (first, second, sign) = match order {
            RotationOrder::Xyz => ((-90.0, Axis::Z), (-90.0, Axis::X), 1.0),
            RotationOrder::Xzy => ((-90.0, Axis::Z), (0.0, Axis::X), -1.0),
            RotationOrder::Yzx => ((0.0, Axis::Z), (0.0, Axis::X), 1.0),
            RotationOrder::Yxz => ((0.0, Axis::Z), (90.0, Axis::Y), -1.0),
            RotationOrder::Zxy => ((90.0, Axis::X), (90.0, Axis::Z), 1.0),
            RotationOrder::Zyx => ((90.0, Axis::X), (180.0, Axis::Z), -1.0),
        };
        Self {
            first,
            second,
            sign,
        }
    }

    pub fn matrix(&self) -> DMat3 {
        axis_rotation(self.second.0, self.second.1) * axis_rotation(self.first.0, self.first.1)
    }
}

impl Bone {
    /// Rotation taking bone-space vectors to armature space.
    pub fn local_to_global_rotation(&self) -> DMat3 {
        self.rotation
    }

    pub fn local_to_global(&self) -> DMat4 {
        DMat4::from_translation(self.origin) * DMat4::from_mat3(self.rotation)
    }

    pub fn global_to_local(&self) -> DMat4 {
        self.local_to_global().inverse()
    }

    /// The twist axis in armature space.
    pub fn twist_direction(&self) -> DVec3 {
        self.rotation * self.rotation_order.twist_axis().unit()
    }

    /// True if `point` lies on the twist axis line through the origin.
    pub fn is_collinear(&self, point: DVec3) -> bool {
        let offset = point - self.origin;
        if offset.length() == 0.0 {
            return true;
        }
        let angle = self.twist_direction().angle_between(offset).to_degrees();
        angle < COLLINEAR_TOLERANCE_DEG || angle > 180.0 - COLLINEAR_TOLERANCE_DEG
    }

    pub fn order_rotation(&self) -> DMat3 {
        AxisRemap::for_order(self.rotation_order).matrix()
    }

    /// Global-to-local transform followed by the axis remap that puts the zero angle of
    /// `axis`'s falloff on +X of the resulting XY plane.
    ///
    /// For x the zero angle is local -Z, for y and z it is local +X.
    pub fn weight_angle_transform(&self, axis: Axis) -> DMat4 {
        let remap = match axis {
            Axis::X => axis_rotation(-90.0, Axis::Y),
            Axis::Y => axis_rotation(-90.0, Axis::X),
            Axis::Z => DMat3::IDENTITY,
        };
        DMat4::from_mat3(remap) * self.global_to_local()
    }

    /// Angle in `[0, 360)` of a world-space point around `axis`.
    pub fn angle_at(&self, axis: Axis, point: DVec3) -> f64 {
        plane_angle(self.weight_angle_transform(axis).transform_point3(point))
    }

    /// Position of a world-space point along `axis` in the falloff frame.
    pub fn twist_at(&self, axis: Axis, point: DVec3) -> f64 {
        self.weight_angle_transform(axis).transform_point3(point).z
    }
}

impl Armature {
    /// The nearest child whose origin lies on the twist axis, ignoring children that
    /// start at the bone's own origin. `None` also for an index past the last bone.
    pub fn best_collinear_child(&self, index: usize) -> Option<usize> {
        let bone = self.bone_at(index)?;
        let mut best: Option<(usize, f64)> = None;
        for &c in bone.child_indices() {
            let origin = self.bones()[c].origin;
            if origin == bone.origin || !bone.is_collinear(origin) {
                continue;
            }
            let distance = bone.origin.distance(origin);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((c, distance));
            }
        }
        best.map(|(c, _)| c)
    }

    /// Length of the bone along its twist axis, negative when the twist axis points
    /// away from where the bone's descendants are.
    pub fn descendant_length(&self, index: usize) -> Option<f64> {
        let bone = self.bone_at(index)?;
        let to_endpoint = bone.endpoint_or_origin() - bone.origin;
        let children = bone.child_indices();

        let mut target = match children {
            [] => to_endpoint,
            [only] => {
                let to_child = self.bones()[*only].origin - bone.origin;
                if to_child == DVec3::ZERO {
                    to_endpoint
                } else {
                    to_child
                }
            }
            _ => match self.best_collinear_child(index) {
                Some(c) => self.bones()[c].origin - bone.origin,
                None => {
                    let sum: DVec3 = children.iter().map(|&c| self.bones()[c].origin).sum();
                    sum / children.len() as f64 - bone.origin
                }
            },
        };
        if target == DVec3::ZERO {
            target = to_endpoint;
        }

        let length = target.length();
        if length == 0.0 {
            log::warn!("bone '{}' has no extent, using length 1", bone.id);
            return Some(1.0);
        }
        if bone.twist_direction().angle_between(target).to_degrees() < 90.0 {
            Some(length)
        } else {
            Some(-length)
        }
    }

    /// Matrix applied to a unit bone along +Y before the bone's own rotation: remaps the
    /// axes, scales to the descendant length and turns the bone around if that length is
    /// negative.
    pub fn pre_transform(&self, index: usize) -> Option<DMat3> {
        let bone = self.bone_at(index)?;
        let length = self.descendant_length(index)?;
        let scale = DMat3::from_diagonal(DVec3::splat(length.abs()));
        let flip = if length < 0.0 {
            axis_rotation(180.0, Axis::Z)
        } else {
            DMat3::IDENTITY
        };
        Some(bone.order_rotation() * scale * flip)
    }

    /// Armature-space placement of a unit bone along +Y.
    pub fn bone_matrix(&self, index: usize) -> Option<DMat4> {
        let bone = self.bone_at(index)?;
        let pre = self.pre_transform(index)?;
        Some(
            DMat4::from_translation(bone.origin)
                * DMat4::from_mat3(bone.local_to_global_rotation() * pre),
        )
    }
}
