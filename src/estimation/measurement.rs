//! Measurement models `z = h(x)` and their Jacobians `H = dh/dx` for the
//! six-channel estimate `[x, y, vx, vy, theta, omega]`.

use nalgebra::{SMatrix, SVector, Vector1, Vector4};

use crate::config::EnvironmentConfig;
use crate::dynamics::planar::{self, Actuation};
use crate::dynamics::state::RocketState;
use crate::physics::{aerodynamics, frames};
use crate::vehicle::RocketConfig;

pub type EstimateVector = SVector<f64, 6>;

/// Predicted measurement and its Jacobian.
pub struct Model<const D: usize> {
    pub predicted: SVector<f64, D>,
    pub jacobian: SMatrix<f64, D, 6>,
}

/// Barometric altimeter: altitude.
pub fn altimeter(x: &EstimateVector) -> Model<1> {
    let mut h = SMatrix::<f64, 1, 6>::zeros();
    h[(0, 1)] = 1.0;
    Model { predicted: Vector1::new(x[1]), jacobian: h }
}

/// Gyroscope: pitch rate.
pub fn gyro(x: &EstimateVector) -> Model<1> {
    let mut h = SMatrix::<f64, 1, 6>::zeros();
    h[(0, 5)] = 1.0;
    Model { predicted: Vector1::new(x[5]), jacobian: h }
}

/// GPS: position and velocity.
pub fn gps(x: &EstimateVector) -> Model<4> {
    let mut h = SMatrix::<f64, 4, 6>::zeros();
    for i in 0..4 {
        h[(i, i)] = 1.0;
    }
    Model {
        predicted: Vector4::new(x[0], x[1], x[2], x[3]),
        jacobian: h,
    }
}

/// Accelerometer: specific force along the body axis.
///
/// h = (T cos(delta) + D . n) / m, with n = (sin theta, cos theta) the nose
/// axis and D = -k |v| v the drag force. Thrust along the axis does not
/// depend on the state, so only the drag term contributes to H.
pub fn accelerometer(
    x: &EstimateVector,
    mass: f64,
    act: &Actuation,
    rocket: &RocketConfig,
    env: &EnvironmentConfig,
) -> Model<1> {
    let state = state_with_mass(x, mass);
    let f = planar::specific_force(&state, act, rocket, env);
    let axial = frames::world_to_body(&f, state.theta).x;

    let mut h = SMatrix::<f64, 1, 6>::zeros();
    let speed = state.speed();
    if speed > aerodynamics::MIN_DRAG_SPEED {
        let k = 0.5 * env.air_density * rocket.drag_coeff * rocket.reference_area() / mass;
        let (s, c) = state.theta.sin_cos();
        let along = state.vx * s + state.vy * c;
        h[(0, 2)] = -k * (state.vx / speed * along + speed * s);
        h[(0, 3)] = -k * (state.vy / speed * along + speed * c);
        h[(0, 4)] = -k * speed * (state.vx * c - state.vy * s);
    }

    Model { predicted: Vector1::new(axial), jacobian: h }
}

pub(crate) fn state_with_mass(x: &EstimateVector, mass: f64) -> RocketState {
    RocketState {
        x: x[0],
        y: x[1],
        vx: x[2],
        vy: x[3],
        theta: x[4],
        omega: x[5],
        mass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_models_select_channels() {
        let x = EstimateVector::from([1.0, 2.0, 3.0, 4.0, 0.1, 0.2]);
        assert_eq!(altimeter(&x).predicted[0], 2.0);
        assert_eq!(gyro(&x).predicted[0], 0.2);
        let g = gps(&x);
        assert_eq!(g.predicted, Vector4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!((g.jacobian * x), g.predicted);
    }

    #[test]
    fn accelerometer_on_pad_reads_thrust_over_mass() {
        let r = RocketConfig::default();
        let env = EnvironmentConfig::default();
        let x = EstimateVector::zeros();
        let act = Actuation { thrust: r.max_thrust, gimbal: 0.0 };
        let m = accelerometer(&x, r.total_mass(), &act, &r, &env);
        assert!((m.predicted[0] - 15.0).abs() < 1e-12);
        assert_eq!(m.jacobian, SMatrix::<f64, 1, 6>::zeros(), "No drag sensitivity at rest");
    }

    #[test]
    fn accelerometer_jacobian_matches_central_difference() {
        let r = RocketConfig::default();
        let env = EnvironmentConfig::default();
        let x = EstimateVector::from([5.0, 400.0, 12.0, 90.0, 0.15, 0.01]);
        let act = Actuation { thrust: r.max_thrust, gimbal: 0.02 };
        let mass = 76.0;
        let h = accelerometer(&x, mass, &act, &r, &env).jacobian;

        let eps = 1e-6;
        for j in 0..6 {
            let mut plus = x;
            let mut minus = x;
            plus[j] += eps;
            minus[j] -= eps;
            let numeric = (accelerometer(&plus, mass, &act, &r, &env).predicted[0]
                - accelerometer(&minus, mass, &act, &r, &env).predicted[0])
                / (2.0 * eps);
            assert!(
                (h[(0, j)] - numeric).abs() < 1e-6,
                "H[{j}]: analytic {} vs numeric {}",
                h[(0, j)],
                numeric
            );
        }
    }
}
