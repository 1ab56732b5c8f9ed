use std::f64::consts::{PI, TAU};

use nalgebra::{Matrix2, Vector2};

// ---------------------------------------------------------------------------
// Planar kinematics: angle wrapping and body <-> world transforms
// ---------------------------------------------------------------------------
//
// World frame: x right, y up.
// Body frame:  [along-axis (nose), perpendicular (right)].
// theta = 0 points the nose along world +y; positive theta is clockwise.

/// Wrap an angle into (-pi, pi].
pub fn wrap_angle(theta: f64) -> f64 {
    let wrapped = PI - (PI - theta).rem_euclid(TAU);
    // rem_euclid can return TAU itself for tiny negative inputs
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Body -> world rotation for pitch angle `theta`.
///
/// Column 0 is the nose direction `(sin θ, cos θ)`, column 1 the body-right
/// direction `(cos θ, -sin θ)`. The matrix is symmetric and its own inverse.
pub fn rotation_matrix(theta: f64) -> Matrix2<f64> {
    let (s, c) = theta.sin_cos();
    Matrix2::new(
        s, c,
        c, -s,
    )
}

pub fn body_to_world(vec_body: &Vector2<f64>, theta: f64) -> Vector2<f64> {
    rotation_matrix(theta) * vec_body
}

pub fn world_to_body(vec_world: &Vector2<f64>, theta: f64) -> Vector2<f64> {
    rotation_matrix(theta).transpose() * vec_world
}

/// Unit vector along the rocket axis in the world frame.
pub fn nose_axis(theta: f64) -> Vector2<f64> {
    let (s, c) = theta.sin_cos();
    Vector2::new(s, c)
}
