use nalgebra::{Matrix6, SMatrix, SVector, Vector1, Vector4};
use tracing::{debug, warn};

use crate::config::{EnvironmentConfig, KalmanConfig, SensorConfig};
use crate::dynamics::planar::{self, Actuation};
use crate::dynamics::state::{GncCommand, RocketState};
use crate::physics::frames::wrap_angle;
use crate::sensors::{GpsFix, SensorReadings};
use crate::sim::integrator::step_state;
use crate::vehicle::RocketConfig;

use super::measurement::{self, state_with_mass, EstimateVector, Model};

const THETA: usize = 4;

// ---------------------------------------------------------------------------
// Filter output
// ---------------------------------------------------------------------------

/// Best estimate of the rocket state (mass excluded).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Estimate {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub theta: f64,
    pub omega: f64,
}

impl From<&EstimateVector> for Estimate {
    fn from(v: &EstimateVector) -> Self {
        Self { x: v[0], y: v[1], vx: v[2], vy: v[3], theta: v[4], omega: v[5] }
    }
}

/// Outcome of a single measurement update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateStatus {
    Applied,
    /// Normalized innovation squared exceeded the gate; reading ignored.
    Gated { nis: f64 },
    /// Innovation covariance not invertible; update skipped.
    Singular,
}

/// Tally of the updates performed in one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateReport {
    pub applied: u32,
    pub gated: u32,
    pub singular: u32,
}

impl UpdateReport {
    fn record(&mut self, status: UpdateStatus) {
        match status {
            UpdateStatus::Applied => self.applied += 1,
            UpdateStatus::Gated { .. } => self.gated += 1,
            UpdateStatus::Singular => self.singular += 1,
        }
    }

    /// True when at least one reading could not be fused for numerical reasons.
    pub fn degraded(&self) -> bool {
        self.singular > 0
    }
}

// ---------------------------------------------------------------------------
// Extended Kalman filter over [x, y, vx, vy, theta, omega]
// ---------------------------------------------------------------------------

/// EKF fusing accelerometer, gyroscope, altimeter and GPS readings.
///
/// Mass is not estimated: the filter carries its own mass, propagated
/// open-loop from the commanded burn with the same mass-flow law as the
/// plant.
#[derive(Debug, Clone)]
pub struct Ekf {
    x: EstimateVector,
    p: Matrix6<f64>,
    q_density: Matrix6<f64>,
    mass: f64,
    gate: f64,

    r_accel: f64,
    r_gyro: f64,
    r_altimeter: f64,
    r_gps_pos: f64,
    r_gps_vel: f64,

    rocket: RocketConfig,
    env: EnvironmentConfig,
    act: Actuation,
}

impl Ekf {
    pub fn new(
        initial: &RocketState,
        kalman: &KalmanConfig,
        sensor: &SensorConfig,
        rocket: &RocketConfig,
        env: &EnvironmentConfig,
    ) -> Self {
        let x = EstimateVector::from([
            initial.x, initial.y, initial.vx, initial.vy,
            wrap_angle(initial.theta), initial.omega,
        ]);
        let p0 = SVector::<f64, 6>::from([
            kalman.initial_pos_std, kalman.initial_pos_std,
            kalman.initial_vel_std, kalman.initial_vel_std,
            kalman.initial_theta_std, kalman.initial_omega_std,
        ]);
        let q = SVector::<f64, 6>::from([
            kalman.process_noise_pos, kalman.process_noise_pos,
            kalman.process_noise_vel, kalman.process_noise_vel,
            kalman.process_noise_theta, kalman.process_noise_omega,
        ]);

        Self {
            x,
            p: Matrix6::from_diagonal(&p0.component_mul(&p0)),
            q_density: Matrix6::from_diagonal(&q.component_mul(&q)),
            mass: initial.mass,
            gate: kalman.innovation_gate,
            r_accel: sensor.accel_noise_std.powi(2),
            r_gyro: sensor.gyro_noise_std.powi(2),
            r_altimeter: sensor.altimeter_noise_std.powi(2),
            r_gps_pos: sensor.gps_pos_noise_std.powi(2),
            r_gps_vel: sensor.gps_vel_noise_std.powi(2),
            rocket: rocket.clone(),
            env: env.clone(),
            act: Actuation::coasting(),
        }
    }

    pub fn estimate(&self) -> Estimate {
        Estimate::from(&self.x)
    }

    pub fn state_vector(&self) -> &EstimateVector {
        &self.x
    }

    pub fn covariance(&self) -> &Matrix6<f64> {
        &self.p
    }

    /// Mass assumed by the filter (open-loop burn schedule).
    pub fn mass(&self) -> f64 {
        self.mass
    }

    // =====================================================================
    // PREDICT
    // =====================================================================

    /// Propagate mean and covariance over `dt` with the command that was
    /// applied to the vehicle for this step.
    pub fn predict(&mut self, cmd: &GncCommand, burn_flag: bool, t: f64, dt: f64) {
        let prior = state_with_mass(&self.x, self.mass);
        let act = Actuation::resolve(&prior, cmd, burn_flag, &self.rocket);

        // F = I + A dt, A evaluated at the prior estimate
        let a = planar::jacobian(&prior, &act, &self.rocket, &self.env);
        let f = Matrix6::identity() + a * dt;

        let (rocket, env) = (&self.rocket, &self.env);
        let next = step_state(&prior, t, dt, rocket.dry_mass, |_, s| {
            planar::derivatives(s, &act, rocket, env)
        });

        self.x = EstimateVector::from([next.x, next.y, next.vx, next.vy, next.theta, next.omega]);
        self.mass = next.mass;
        self.act = act;

        self.p = f * self.p * f.transpose() + self.q_density * dt;
        self.symmetrize();
    }

    // =====================================================================
    // UPDATES
    // =====================================================================

    /// Fuse every reading that is present, in a fixed sensor order.
    pub fn update(&mut self, readings: &SensorReadings) -> UpdateReport {
        let mut report = UpdateReport::default();
        if let Some(z) = readings.accel {
            report.record(self.update_accel(z));
        }
        if let Some(z) = readings.gyro {
            report.record(self.update_gyro(z));
        }
        if let Some(z) = readings.altimeter {
            report.record(self.update_altimeter(z));
        }
        if let Some(fix) = readings.gps {
            report.record(self.update_gps(&fix));
        }
        report
    }

    pub fn update_accel(&mut self, z: f64) -> UpdateStatus {
        let model = measurement::accelerometer(&self.x, self.mass, &self.act, &self.rocket, &self.env);
        let r = SMatrix::<f64, 1, 1>::new(self.r_accel);
        self.correct("accelerometer", &Vector1::new(z), model, &r)
    }

    pub fn update_gyro(&mut self, z: f64) -> UpdateStatus {
        let model = measurement::gyro(&self.x);
        let r = SMatrix::<f64, 1, 1>::new(self.r_gyro);
        self.correct("gyroscope", &Vector1::new(z), model, &r)
    }

    pub fn update_altimeter(&mut self, z: f64) -> UpdateStatus {
        let model = measurement::altimeter(&self.x);
        let r = SMatrix::<f64, 1, 1>::new(self.r_altimeter);
        self.correct("altimeter", &Vector1::new(z), model, &r)
    }

    pub fn update_gps(&mut self, fix: &GpsFix) -> UpdateStatus {
        let model = measurement::gps(&self.x);
        let r = SMatrix::<f64, 4, 4>::from_diagonal(&Vector4::new(
            self.r_gps_pos,
            self.r_gps_pos,
            self.r_gps_vel,
            self.r_gps_vel,
        ));
        let z = Vector4::new(fix.x, fix.y, fix.vx, fix.vy);
        self.correct("gps", &z, model, &r)
    }

    fn correct<const D: usize>(
        &mut self,
        sensor: &'static str,
        z: &SVector<f64, D>,
        model: Model<D>,
        r: &SMatrix<f64, D, D>,
    ) -> UpdateStatus {
        let h = model.jacobian;
        let innovation = z - model.predicted;

        let s = h * self.p * h.transpose() + r;
        let s_inv = match s.try_inverse() {
            Some(inv) if inv.iter().all(|v| v.is_finite()) => inv,
            _ => {
                warn!(sensor, "innovation covariance is singular, skipping update");
                return UpdateStatus::Singular;
            }
        };

        let nis = (innovation.transpose() * s_inv * innovation)[(0, 0)];
        if !nis.is_finite() {
            warn!(sensor, "non-finite innovation, skipping update");
            return UpdateStatus::Singular;
        }
        if nis > self.gate * self.gate * D as f64 {
            debug!(sensor, nis, "reading rejected by innovation gate");
            return UpdateStatus::Gated { nis };
        }

        let k = self.p * h.transpose() * s_inv;
        let dx = k * innovation;
        if dx.iter().any(|v| !v.is_finite()) {
            warn!(sensor, "non-finite correction, skipping update");
            return UpdateStatus::Singular;
        }

        self.x += dx;
        self.x[THETA] = wrap_angle(self.x[THETA]);

        // Joseph form keeps P symmetric positive semi-definite
        let i_kh = Matrix6::identity() - k * h;
        self.p = i_kh * self.p * i_kh.transpose() + k * r * k.transpose();
        self.symmetrize();

        UpdateStatus::Applied
    }

    fn symmetrize(&mut self) {
        self.p = (self.p + self.p.transpose()) * 0.5;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_at(state: &RocketState) -> Ekf {
        Ekf::new(
            state,
            &KalmanConfig::default(),
            &SensorConfig::default(),
            &RocketConfig::default(),
            &EnvironmentConfig::default(),
        )
    }

    fn flying() -> RocketState {
        RocketState {
            x: 3.0,
            y: 250.0,
            vx: 1.0,
            vy: 60.0,
            theta: 0.02,
            omega: 0.0,
            mass: 78.0,
        }
    }

    #[test]
    fn initial_covariance_from_config() {
        let ekf = filter_at(&flying());
        let p = ekf.covariance();
        assert_eq!(p[(0, 0)], 25.0);
        assert_eq!(p[(2, 2)], 1.0);
        assert!((p[(4, 4)] - 0.01).abs() < 1e-15);
        assert!((p[(5, 5)] - 0.0025).abs() < 1e-15);
        assert_eq!(p[(0, 1)], 0.0);
        assert_eq!(ekf.estimate().y, 250.0);
    }

    #[test]
    fn predict_follows_dynamics_and_grows_uncertainty() {
        let mut ekf = filter_at(&flying());
        let p_before = ekf.covariance()[(1, 1)];
        ekf.predict(&GncCommand::default(), true, 0.0, 0.01);
        let est = ekf.estimate();
        assert!(est.y > 250.0 && est.vy > 60.0, "burning rocket climbs and speeds up");
        assert!(ekf.covariance()[(1, 1)] > p_before);
        assert!(ekf.mass() < 78.0, "filter burns its own propellant");
    }

    #[test]
    fn altimeter_pulls_estimate_and_shrinks_variance() {
        let mut ekf = filter_at(&flying());
        let p_before = ekf.covariance()[(1, 1)];
        let status = ekf.update_altimeter(254.0);
        assert_eq!(status, UpdateStatus::Applied);
        let est = ekf.estimate();
        assert!(est.y > 250.0 && est.y < 254.0, "estimate moves toward reading, got {}", est.y);
        assert!(ekf.covariance()[(1, 1)] < p_before);
        // Uncorrelated channels are untouched
        assert_eq!(est.x, 3.0);
    }

    #[test]
    fn gps_corrects_all_four_channels() {
        let mut ekf = filter_at(&flying());
        let fix = GpsFix { x: 5.0, y: 252.0, vx: 1.5, vy: 59.0 };
        assert_eq!(ekf.update_gps(&fix), UpdateStatus::Applied);
        let est = ekf.estimate();
        assert!(est.x > 3.0 && est.y > 250.0 && est.vx > 1.0 && est.vy < 60.0);
    }

    #[test]
    fn singular_innovation_is_skipped() {
        let kalman = KalmanConfig {
            initial_pos_std: 0.0,
            initial_vel_std: 0.0,
            initial_theta_std: 0.0,
            initial_omega_std: 0.0,
            ..KalmanConfig::default()
        };
        let mut ekf = Ekf::new(
            &flying(),
            &kalman,
            &SensorConfig::ideal(),
            &RocketConfig::default(),
            &EnvironmentConfig::default(),
        );
        let before = *ekf.state_vector();
        assert_eq!(ekf.update_altimeter(260.0), UpdateStatus::Singular);
        assert_eq!(*ekf.state_vector(), before);
        assert!(ekf.state_vector().iter().all(|v| v.is_finite()));

        let report = ekf.update(&SensorReadings { altimeter: Some(260.0), ..Default::default() });
        assert!(report.degraded());
    }

    #[test]
    fn outlier_is_gated() {
        let mut ekf = filter_at(&flying());
        let before = *ekf.state_vector();
        match ekf.update_altimeter(1.0e5) {
            UpdateStatus::Gated { nis } => assert!(nis > 25.0),
            other => panic!("expected gated update, got {other:?}"),
        }
        assert_eq!(*ekf.state_vector(), before);
    }

    #[test]
    fn gyro_update_keeps_theta_wrapped() {
        let s = RocketState { theta: 3.14, omega: 0.0, ..flying() };
        let mut ekf = filter_at(&s);
        for i in 0..200 {
            ekf.predict(&GncCommand::default(), false, i as f64 * 0.01, 0.01);
            ekf.update_gyro(0.5);
        }
        let theta = ekf.estimate().theta;
        assert!(theta > -std::f64::consts::PI && theta <= std::f64::consts::PI);
    }

    #[test]
    fn covariance_stays_symmetric_with_non_negative_diagonal() {
        let mut ekf = filter_at(&flying());
        let readings = SensorReadings {
            accel: Some(15.2),
            gyro: Some(0.001),
            altimeter: Some(251.0),
            gps: Some(GpsFix { x: 2.0, y: 249.0, vx: 1.1, vy: 60.3 }),
        };
        for i in 0..500 {
            ekf.predict(&GncCommand { gimbal: 0.01 }, true, i as f64 * 0.01, 0.01);
            ekf.update(&readings);
            let p = ekf.covariance();
            assert!(p.diagonal().iter().all(|&d| d >= 0.0), "negative variance at step {i}");
            assert!((p - p.transpose()).abs().max() < 1e-12);
        }
    }
}
