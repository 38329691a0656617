//! Planar and angular helpers shared by the controller and the backends.
//!
//! Conventions
//! - +Y is up; yaw is measured in radians about +Y.
//! - Yaw 0 faces +Z, yaw π/2 faces +X: `forward(yaw) = (sin yaw, 0, cos yaw)`.

use std::f32::consts::{PI, TAU};

use nalgebra::{Vector2, Vector3};

/// Drop the Y component: world XYZ → planar XZ.
#[inline]
pub fn to_planar(v: Vector3<f32>) -> Vector2<f32> {
    Vector2::new(v.x, v.z)
}

/// Planar (XZ) distance between two world positions (meters).
#[inline]
pub fn planar_distance(a: Vector3<f32>, b: Vector3<f32>) -> f32 {
    (to_planar(b) - to_planar(a)).norm()
}

/// Unit forward vector for a yaw.
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vector3<f32> {
    Vector3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Unit right vector for a yaw (forward rotated by -90° about +Y).
#[inline]
pub fn right_from_yaw(yaw: f32) -> Vector3<f32> {
    Vector3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Shortest signed angle from `from` to `to`, in `[-π, π)`.
#[inline]
pub fn delta_angle(from: f32, to: f32) -> f32 {
    (to - from + PI).rem_euclid(TAU) - PI
}

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

/// Critically damped spring toward `target`.
///
/// `velocity` is the caller-owned rate of change carried between ticks. `smooth_time` is
/// roughly the time to reach the target; it is floored at a small positive value.
/// Never overshoots the target.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(1.0e-4);
    let omega = 2.0 / smooth_time;

    // Padé approximation of exp(-omega * dt).
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }

    output
}

/// [`smooth_damp`] for angles: always turns the short way around.
pub fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, dt)
}
