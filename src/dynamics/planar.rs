use nalgebra::{Matrix6, Vector2};

use crate::config::EnvironmentConfig;
use crate::dynamics::state::{GncCommand, RocketState, StateVector, G0};
use crate::physics::{aerodynamics, frames, gravity};
use crate::vehicle::RocketConfig;

// ---------------------------------------------------------------------------
// Actuator inputs held constant over one integration step
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Actuation {
    pub thrust: f64,   // N
    pub gimbal: f64,   // rad, already clamped to the gimbal limit
}

impl Actuation {
    /// Resolve a controller command into what the engine actually does.
    ///
    /// The engine burns while `burn_flag` holds and fuel remains; the gimbal
    /// is clamped to `±max_gimbal_angle`.
    pub fn resolve(
        state: &RocketState,
        cmd: &GncCommand,
        burn_flag: bool,
        rocket: &RocketConfig,
    ) -> Self {
        let burning = burn_flag && state.mass > rocket.dry_mass;
        let limit = rocket.max_gimbal_angle;
        Actuation {
            thrust: if burning { rocket.max_thrust } else { 0.0 },
            gimbal: frames::clamp(cmd.gimbal, -limit, limit),
        }
    }

    pub fn coasting() -> Self {
        Self::default()
    }
}

/// Thrust actually produced at this mass (none once the tank is dry).
fn available_thrust(state: &RocketState, act: &Actuation, rocket: &RocketConfig) -> f64 {
    if state.mass > rocket.dry_mass {
        act.thrust
    } else {
        0.0
    }
}

fn thrust_body(thrust: f64, gimbal: f64) -> Vector2<f64> {
    let (s, c) = gimbal.sin_cos();
    Vector2::new(thrust * c, thrust * s)
}

// ---------------------------------------------------------------------------
// Planar equations of motion
// ---------------------------------------------------------------------------

/// Compute the derivative of `[x, y, vx, vy, theta, omega, mass]`.
///
/// Forces & moments:
///   1. Thrust, deflected by the gimbal (body frame → world)
///   2. Quadratic drag opposing velocity
///   3. Uniform gravity
///   4. Pitch torque from the lateral thrust component on the CP-CG arm
pub fn derivatives(
    state: &RocketState,
    act: &Actuation,
    rocket: &RocketConfig,
    env: &EnvironmentConfig,
) -> StateVector {
    let thrust = available_thrust(state, act, rocket);

    // --- Thrust (body → world) ---
    let f_thrust_body = thrust_body(thrust, act.gimbal);
    let f_thrust = frames::body_to_world(&f_thrust_body, state.theta);

    // --- Drag & gravity ---
    let f_drag = aerodynamics::drag_force(
        &state.vel(),
        env.air_density,
        rocket.drag_coeff,
        rocket.reference_area(),
    );
    let f_gravity = gravity::gravity_force(state.mass, env.gravity);

    let accel = (f_thrust + f_drag + f_gravity) / state.mass;

    // --- Pitch ---
    let torque = f_thrust_body.y * rocket.moment_arm();
    let alpha = torque / rocket.moment_of_inertia;

    // --- Mass flow ---
    let dmass = -thrust / (rocket.isp * G0);

    StateVector::from([
        state.vx, state.vy,
        accel.x, accel.y,
        state.omega, alpha,
        dmass,
    ])
}

/// Non-gravitational acceleration (what an accelerometer senses), world frame.
pub fn specific_force(
    state: &RocketState,
    act: &Actuation,
    rocket: &RocketConfig,
    env: &EnvironmentConfig,
) -> Vector2<f64> {
    let thrust = available_thrust(state, act, rocket);
    let f_thrust = frames::body_to_world(&thrust_body(thrust, act.gimbal), state.theta);
    let f_drag = aerodynamics::drag_force(
        &state.vel(),
        env.air_density,
        rocket.drag_coeff,
        rocket.reference_area(),
    );
    (f_thrust + f_drag) / state.mass
}

/// Analytic Jacobian of the first six derivative channels with respect to
/// `[x, y, vx, vy, theta, omega]`, holding mass and actuation fixed.
pub fn jacobian(
    state: &RocketState,
    act: &Actuation,
    rocket: &RocketConfig,
    env: &EnvironmentConfig,
) -> Matrix6<f64> {
    let thrust = available_thrust(state, act, rocket);
    let mut a = Matrix6::zeros();

    // d(pos)/dt = vel
    a[(0, 2)] = 1.0;
    a[(1, 3)] = 1.0;

    // Drag depends on velocity only
    let d_drag = aerodynamics::drag_jacobian(
        &state.vel(),
        env.air_density,
        rocket.drag_coeff,
        rocket.reference_area(),
    ) / state.mass;
    a.fixed_view_mut::<2, 2>(2, 2).copy_from(&d_drag);

    // World thrust = T * (sin(theta + delta), cos(theta + delta))
    let (s, c) = (state.theta + act.gimbal).sin_cos();
    a[(2, 4)] = thrust * c / state.mass;
    a[(3, 4)] = -thrust * s / state.mass;

    // d(theta)/dt = omega; alpha does not depend on the state
    a[(4, 5)] = 1.0;

    a
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pad_state(rocket: &RocketConfig) -> RocketState {
        RocketState::at_rest(rocket.total_mass())
    }

    fn full_thrust(rocket: &RocketConfig, gimbal: f64) -> Actuation {
        Actuation { thrust: rocket.max_thrust, gimbal }
    }

    #[test]
    fn net_upward_accel_on_pad() {
        let r = RocketConfig::default();
        let env = EnvironmentConfig::default();
        let d = derivatives(&pad_state(&r), &full_thrust(&r, 0.0), &r, &env);
        let expected = 1200.0 / 80.0 - 9.81;
        assert!((d[3] - expected).abs() < 1e-12, "TWR > 1 → net upward, got {}", d[3]);
        assert_eq!(d[2], 0.0);
        assert_eq!(d[5], 0.0, "No gimbal → no torque");
    }

    #[test]
    fn mass_decreases_during_burn() {
        let r = RocketConfig::default();
        let env = EnvironmentConfig::default();
        let d = derivatives(&pad_state(&r), &full_thrust(&r, 0.0), &r, &env);
        assert!((d[6] + r.mass_flow()).abs() < 1e-15);
    }

    #[test]
    fn no_thrust_when_tank_is_dry() {
        let r = RocketConfig::default();
        let env = EnvironmentConfig::default();
        let s = RocketState { vy: 50.0, ..RocketState::at_rest(r.dry_mass) };
        let d = derivatives(&s, &full_thrust(&r, 0.0), &r, &env);
        assert_eq!(d[6], 0.0);
        assert!(d[3] < -9.81, "Only gravity + drag on a dry rocket");
    }

    #[test]
    fn resolve_clamps_gimbal_and_cuts_engine() {
        let r = RocketConfig::default();
        let s = pad_state(&r);
        let act = Actuation::resolve(&s, &GncCommand { gimbal: 1.0 }, true, &r);
        assert_eq!(act.gimbal, r.max_gimbal_angle);
        assert_eq!(act.thrust, r.max_thrust);

        let off = Actuation::resolve(&s, &GncCommand { gimbal: -1.0 }, false, &r);
        assert_eq!(off.thrust, 0.0);
        assert_eq!(off.gimbal, -r.max_gimbal_angle);
    }

    #[test]
    fn positive_gimbal_creates_positive_torque() {
        let r = RocketConfig::default();
        let env = EnvironmentConfig::default();
        let d = derivatives(&pad_state(&r), &full_thrust(&r, 0.05), &r, &env);
        let expected = 1200.0 * 0.05_f64.sin() * 0.4 / 80.0;
        assert!((d[5] - expected).abs() < 1e-12);
        assert!(d[2] > 0.0, "Deflected thrust pushes to +x");
    }

    #[test]
    fn free_fall_without_thrust() {
        let r = RocketConfig::default();
        let env = EnvironmentConfig { air_density: 0.0, ..EnvironmentConfig::default() };
        let s = RocketState { vx: 20.0, vy: -5.0, theta: 0.4, ..RocketState::at_rest(60.0) };
        let d = derivatives(&s, &Actuation::coasting(), &r, &env);
        assert_eq!(d[2], 0.0);
        assert!((d[3] + env.gravity).abs() < 1e-12);
        let f = specific_force(&s, &Actuation::coasting(), &r, &env);
        assert_eq!(f, Vector2::zeros(), "Free fall senses nothing");
    }

    #[test]
    fn specific_force_excludes_gravity() {
        let r = RocketConfig::default();
        let env = EnvironmentConfig::default();
        let s = RocketState { vx: 3.0, vy: 40.0, theta: 0.05, omega: 0.01, ..pad_state(&r) };
        let act = full_thrust(&r, -0.02);
        let d = derivatives(&s, &act, &r, &env);
        let f = specific_force(&s, &act, &r, &env);
        assert!((f.x - d[2]).abs() < 1e-12);
        assert!((f.y - (d[3] + env.gravity)).abs() < 1e-12);
    }

    #[test]
    fn jacobian_matches_central_difference() {
        let r = RocketConfig::default();
        let env = EnvironmentConfig::default();
        let s = RocketState {
            x: 10.0,
            y: 300.0,
            vx: 4.0,
            vy: 70.0,
            theta: 0.08,
            omega: -0.02,
            mass: 77.0,
        };
        let act = full_thrust(&r, 0.03);
        let jac = jacobian(&s, &act, &r, &env);

        let h = 1e-6;
        for j in 0..6 {
            let mut plus = s.to_array();
            let mut minus = s.to_array();
            plus[j] += h;
            minus[j] -= h;
            let fp = derivatives(&RocketState::from_array(&plus), &act, &r, &env);
            let fm = derivatives(&RocketState::from_array(&minus), &act, &r, &env);
            for i in 0..6 {
                let numeric = (fp[i] - fm[i]) / (2.0 * h);
                assert!(
                    (jac[(i, j)] - numeric).abs() < 1e-5,
                    "A[{i}][{j}]: analytic {} vs numeric {}",
                    jac[(i, j)],
                    numeric
                );
            }
        }
    }
}
