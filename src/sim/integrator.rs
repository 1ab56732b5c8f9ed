use nalgebra::SVector;

use crate::dynamics::state::{RocketState, StateVector};
use crate::physics::frames::wrap_angle;

// ---------------------------------------------------------------------------
// Classical 4th-order Runge-Kutta
// ---------------------------------------------------------------------------

/// Single RK4 step of `dy/dt = f(t, y)` over any fixed-size state.
pub fn rk4_step<const N: usize, F>(y: &SVector<f64, N>, t: f64, dt: f64, f: F) -> SVector<f64, N>
where
    F: Fn(f64, &SVector<f64, N>) -> SVector<f64, N>,
{
    let half = dt * 0.5;
    let k1 = f(t, y);
    let k2 = f(t + half, &(y + k1 * half));
    let k3 = f(t + half, &(y + k2 * half));
    let k4 = f(t + dt, &(y + k3 * dt));

    y + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

/// Advance the physical state by one step.
///
/// `deriv` receives the stage time and the unpacked stage state. After the
/// step theta is re-wrapped and mass is floored at `dry_mass`.
pub fn step_state<F>(state: &RocketState, t: f64, dt: f64, dry_mass: f64, deriv: F) -> RocketState
where
    F: Fn(f64, &RocketState) -> StateVector,
{
    let next = rk4_step(&state.to_array(), t, dt, |ts, y| {
        deriv(ts, &RocketState::from_array(y))
    });
    let mut out = RocketState::from_array(&next);
    out.theta = wrap_angle(out.theta);
    out.mass = out.mass.max(dry_mass).min(state.mass);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
