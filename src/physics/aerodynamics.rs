use nalgebra::{Matrix2, Vector2};

/// Speed below which the drag direction is undefined and drag is zero.
pub const MIN_DRAG_SPEED: f64 = 1e-9;

/// Quadratic drag force (world frame, opposing velocity).
///
/// |F| = 0.5 * rho * |v|^2 * Cd * A
pub fn drag_force(vel: &Vector2<f64>, air_density: f64, cd: f64, area: f64) -> Vector2<f64> {
    let speed = vel.norm();
    if speed > MIN_DRAG_SPEED {
        let q_dyn = 0.5 * air_density * speed * speed;
        let drag_mag = q_dyn * cd * area;
        vel * (-drag_mag / speed)
    } else {
        Vector2::zeros()
    }
}

/// Partial derivatives of [`drag_force`] with respect to velocity.
///
/// With k = 0.5 * rho * Cd * A and F = -k |v| v:
///   dF/dv = -k (|v| I + v v^T / |v|)
pub fn drag_jacobian(vel: &Vector2<f64>, air_density: f64, cd: f64, area: f64) -> Matrix2<f64> {
    let speed = vel.norm();
    if speed > MIN_DRAG_SPEED {
        let k = 0.5 * air_density * cd * area;
        -(Matrix2::identity() * speed + vel * vel.transpose() / speed) * k
    } else {
        Matrix2::zeros()
    }
}
