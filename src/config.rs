//! Simulation parameters.
//!
//! Every tunable lives in one of these plain value structs. Defaults match the
//! reference vehicle; override any field independently before the run starts,
//! e.g. `SimulationConfig { dt: 0.005, ..Default::default() }`.

use crate::dynamics::state::RocketState;
use crate::error::{self, ConfigError};
use crate::vehicle::RocketConfig;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentConfig {
    pub gravity: f64,       // m/s^2
    pub air_density: f64,   // kg/m^3 (constant, sea level)
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            air_density: 1.225,
        }
    }
}

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    // Accelerometer (body axis)
    pub accel_noise_std: f64,       // m/s^2
    pub accel_bias: f64,            // m/s^2
    pub accel_sample_rate: f64,     // Hz

    // Gyroscope
    pub gyro_noise_std: f64,        // rad/s
    pub gyro_bias: f64,             // rad/s
    pub gyro_sample_rate: f64,      // Hz

    // Barometric altimeter
    pub altimeter_noise_std: f64,   // m
    pub altimeter_bias: f64,        // m
    pub altimeter_sample_rate: f64, // Hz

    // GPS
    pub gps_pos_noise_std: f64,     // m
    pub gps_vel_noise_std: f64,     // m/s
    pub gps_sample_rate: f64,       // Hz
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            accel_noise_std: 0.5,
            accel_bias: 0.02,
            accel_sample_rate: 100.0,
            gyro_noise_std: 0.01,
            gyro_bias: 0.001,
            gyro_sample_rate: 100.0,
            altimeter_noise_std: 1.0,
            altimeter_bias: 0.5,
            altimeter_sample_rate: 50.0,
            gps_pos_noise_std: 2.0,
            gps_vel_noise_std: 0.3,
            gps_sample_rate: 10.0,
        }
    }
}

impl SensorConfig {
    /// Same rates, no noise and no bias. Readings equal the truth.
    pub fn ideal() -> Self {
        Self {
            accel_noise_std: 0.0,
            accel_bias: 0.0,
            gyro_noise_std: 0.0,
            gyro_bias: 0.0,
            altimeter_noise_std: 0.0,
            altimeter_bias: 0.0,
            gps_pos_noise_std: 0.0,
            gps_vel_noise_std: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        error::positive("sensor.accel_sample_rate", self.accel_sample_rate)?;
        error::positive("sensor.gyro_sample_rate", self.gyro_sample_rate)?;
        error::positive("sensor.altimeter_sample_rate", self.altimeter_sample_rate)?;
        error::positive("sensor.gps_sample_rate", self.gps_sample_rate)?;
        error::non_negative("sensor.accel_noise_std", self.accel_noise_std)?;
        error::non_negative("sensor.gyro_noise_std", self.gyro_noise_std)?;
        error::non_negative("sensor.altimeter_noise_std", self.altimeter_noise_std)?;
        error::non_negative("sensor.gps_pos_noise_std", self.gps_pos_noise_std)?;
        error::non_negative("sensor.gps_vel_noise_std", self.gps_vel_noise_std)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Extended Kalman filter tuning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct KalmanConfig {
    // Process noise densities (per sqrt(s))
    pub process_noise_pos: f64,     // m
    pub process_noise_vel: f64,     // m/s
    pub process_noise_theta: f64,   // rad
    pub process_noise_omega: f64,   // rad/s

    // Initial state uncertainty (diagonal of P0)
    pub initial_pos_std: f64,       // m
    pub initial_vel_std: f64,       // m/s
    pub initial_theta_std: f64,     // rad
    pub initial_omega_std: f64,     // rad/s

    /// Reject readings whose normalized innovation exceeds this many sigmas.
    pub innovation_gate: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise_pos: 0.1,
            process_noise_vel: 1.0,
            process_noise_theta: 0.01,
            process_noise_omega: 0.1,
            initial_pos_std: 5.0,
            initial_vel_std: 1.0,
            initial_theta_std: 0.1,
            initial_omega_std: 0.05,
            innovation_gate: 5.0,
        }
    }
}

impl KalmanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        error::non_negative("kalman.process_noise_pos", self.process_noise_pos)?;
        error::non_negative("kalman.process_noise_vel", self.process_noise_vel)?;
        error::non_negative("kalman.process_noise_theta", self.process_noise_theta)?;
        error::non_negative("kalman.process_noise_omega", self.process_noise_omega)?;
        error::non_negative("kalman.initial_pos_std", self.initial_pos_std)?;
        error::non_negative("kalman.initial_vel_std", self.initial_vel_std)?;
        error::non_negative("kalman.initial_theta_std", self.initial_theta_std)?;
        error::non_negative("kalman.initial_omega_std", self.initial_omega_std)?;
        if !(self.innovation_gate > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "kalman.innovation_gate",
                value: self.innovation_gate,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pitch controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub target_theta: f64,      // rad (0 = vertical)
    pub output_min: f64,        // rad
    pub output_max: f64,        // rad
    pub integral_limit: f64,    // rad·s (anti-windup)
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            kp: 10.0,
            ki: 0.5,
            kd: 5.0,
            target_theta: 0.0,
            output_min: -5.0_f64.to_radians(),
            output_max: 5.0_f64.to_radians(),
            integral_limit: 5.0,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.output_min <= self.output_max) {
            return Err(ConfigError::InvertedRange {
                field: "controller.output",
                min: self.output_min,
                max: self.output_max,
            });
        }
        error::non_negative("controller.integral_limit", self.integral_limit)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Launch conditions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialConditions {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub theta: f64,
    pub omega: f64,
}

impl InitialConditions {
    /// Launch state; the rocket always starts fully fuelled.
    pub fn state(&self, rocket: &RocketConfig) -> RocketState {
        RocketState {
            x: self.x,
            y: self.y,
            vx: self.vx,
            vy: self.vy,
            theta: self.theta,
            omega: self.omega,
            mass: rocket.total_mass(),
        }
    }
}

// ---------------------------------------------------------------------------
// Master configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub dt: f64,              // integration timestep, s
    pub t_end: f64,           // run duration, s
    pub t_burn: f64,          // engine cutoff, s
    pub seed: u64,            // sensor noise seed

    pub rocket: RocketConfig,
    pub environment: EnvironmentConfig,
    pub sensor: SensorConfig,
    pub kalman: KalmanConfig,
    pub controller: ControllerConfig,
    pub initial: InitialConditions,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,         // 100 Hz
            t_end: 30.0,
            t_burn: 10.0,
            seed: 42,
            rocket: RocketConfig::default(),
            environment: EnvironmentConfig::default(),
            sensor: SensorConfig::default(),
            kalman: KalmanConfig::default(),
            controller: ControllerConfig::default(),
            initial: InitialConditions::default(),
        }
    }
}

impl SimulationConfig {
    /// Number of fixed steps in a run: floor(t_end / dt).
    pub fn n_steps(&self) -> usize {
        (self.t_end / self.dt).floor() as usize
    }

    pub fn initial_state(&self) -> RocketState {
        self.initial.state(&self.rocket)
    }

    /// Check every invariant the flight loop relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        error::positive("dt", self.dt)?;
        error::positive("t_end", self.t_end)?;
        error::positive("t_burn", self.t_burn)?;
        error::positive("environment.gravity", self.environment.gravity)?;
        error::non_negative("environment.air_density", self.environment.air_density)?;
        self.rocket.validate()?;
        self.sensor.validate()?;
        self.kalman.validate()?;
        self.controller.validate()?;
        Ok(())
    }
}
