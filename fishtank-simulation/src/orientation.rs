//! Heading math: which way an actor should face for a given velocity.

use glam::{Mat3, Quat, Vec3, Vec4};
use std::f32::consts::FRAC_PI_2;

/// Axis the fish model faces in model space
pub const MODEL_FORWARD: Vec3 = Vec3::Z;

/// Extra rotation about Z that lines the model up with its direction of travel
pub const MODEL_ROLL_CORRECTION: f32 = FRAC_PI_2;

/// Shortest-arc rotation taking unit vector `from` onto unit vector `to`.
///
/// For opposite vectors any axis perpendicular to `from` would do; the one
/// picked here depends only on `from`, so the result is stable frame to frame.
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    let r = from.dot(to) + 1.0;

    let raw = if r < f32::EPSILON {
        if from.x.abs() > from.z.abs() {
            Vec4::new(-from.y, from.x, 0.0, 0.0)
        } else {
            Vec4::new(0.0, -from.z, from.y, 0.0)
        }
    } else {
        let axis = from.cross(to);
        Vec4::new(axis.x, axis.y, axis.z, r)
    };

    let normalized = raw.normalize_or_zero();
    if normalized == Vec4::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_vec4(normalized)
    }
}

/// XYZ-order Euler angles (radians) of a unit quaternion.
pub fn euler_xyz(rotation: Quat) -> Vec3 {
    let m = Mat3::from_quat(rotation);
    // m_rc = row r, column c
    let m11 = m.x_axis.x;
    let m12 = m.y_axis.x;
    let m13 = m.z_axis.x;
    let m22 = m.y_axis.y;
    let m23 = m.z_axis.y;
    let m32 = m.y_axis.z;
    let m33 = m.z_axis.z;

    let y = m13.clamp(-1.0, 1.0).asin();
    if m13.abs() < 0.9999999 {
        Vec3::new((-m23).atan2(m33), y, (-m12).atan2(m11))
    } else {
        // Gimbal lock: fold the Z rotation into X
        Vec3::new(m32.atan2(m22), y, 0.0)
    }
}

/// Orientation an actor moving with `velocity` should settle into.
///
/// A zero velocity has no heading and yields the bare roll correction.
pub fn target_orientation(velocity: Vec3) -> Vec3 {
    let heading = velocity.normalize_or_zero();
    let mut target = euler_xyz(rotation_between(MODEL_FORWARD, heading));
    target.z += MODEL_ROLL_CORRECTION;
    target
}

/// Moves each Euler angle a fraction `smoothing` of the way to its target.
///
/// Angles are blended independently rather than interpolated as a rotation,
/// so a heading reversal can swing through odd intermediate poses.
pub fn smooth_orientation(current: Vec3, target: Vec3, smoothing: f32) -> Vec3 {
    current + (target - current) * smoothing
}
