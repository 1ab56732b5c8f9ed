use nalgebra::Vector2;

/// Uniform gravity acceleration (world frame, y up).
pub fn gravity_accel(g: f64) -> Vector2<f64> {
    Vector2::new(0.0, -g)
}

/// Weight of a body of the given mass.
pub fn gravity_force(mass: f64, g: f64) -> Vector2<f64> {
    gravity_accel(g) * mass
}
