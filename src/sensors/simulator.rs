use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::config::SensorConfig;
use crate::dynamics::state::RocketState;
use crate::error::ConfigError;
use crate::physics::frames;

use super::clock::SampleClock;

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Joint GPS position/velocity fix.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GpsFix {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

/// Readings emitted during one step; `None` when a sensor was not due.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorReadings {
    pub accel: Option<f64>,       // specific force along the body axis, m/s^2
    pub gyro: Option<f64>,        // pitch rate, rad/s
    pub altimeter: Option<f64>,   // m
    pub gps: Option<GpsFix>,
}

impl SensorReadings {
    pub fn any(&self) -> bool {
        self.accel.is_some() || self.gyro.is_some() || self.altimeter.is_some() || self.gps.is_some()
    }
}

// ---------------------------------------------------------------------------
// Noise channel: constant bias + white Gaussian noise
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Channel {
    bias: f64,
    noise: Normal<f64>,
}

impl Channel {
    fn new(sensor: &'static str, std_dev: f64, bias: f64) -> Result<Self, ConfigError> {
        let noise = Normal::new(0.0, std_dev).map_err(|_| ConfigError::Noise { sensor, std_dev })?;
        Ok(Self { bias, noise })
    }

    fn read<R: Rng + ?Sized>(&self, truth: f64, rng: &mut R) -> f64 {
        truth + self.bias + self.noise.sample(rng)
    }
}

// ---------------------------------------------------------------------------
// Sensor suite
// ---------------------------------------------------------------------------

/// Accelerometer, gyroscope, barometric altimeter and GPS, each sampled at
/// its own rate from the true state.
///
/// The random source is owned by the simulator and injected at construction,
/// so runs are reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct SensorSimulator<R: Rng = StdRng> {
    rng: R,

    accel_clock: SampleClock,
    gyro_clock: SampleClock,
    altimeter_clock: SampleClock,
    gps_clock: SampleClock,

    accel: Channel,
    gyro: Channel,
    altimeter: Channel,
    gps_pos: Channel,
    gps_vel: Channel,
}

impl SensorSimulator<StdRng> {
    pub fn seeded(cfg: &SensorConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(cfg, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SensorSimulator<R> {
    pub fn new(cfg: &SensorConfig, rng: R) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            rng,
            accel_clock: SampleClock::new(cfg.accel_sample_rate),
            gyro_clock: SampleClock::new(cfg.gyro_sample_rate),
            altimeter_clock: SampleClock::new(cfg.altimeter_sample_rate),
            gps_clock: SampleClock::new(cfg.gps_sample_rate),
            accel: Channel::new("accelerometer", cfg.accel_noise_std, cfg.accel_bias)?,
            gyro: Channel::new("gyroscope", cfg.gyro_noise_std, cfg.gyro_bias)?,
            altimeter: Channel::new("altimeter", cfg.altimeter_noise_std, cfg.altimeter_bias)?,
            gps_pos: Channel::new("gps position", cfg.gps_pos_noise_std, 0.0)?,
            gps_vel: Channel::new("gps velocity", cfg.gps_vel_noise_std, 0.0)?,
        })
    }

    /// Advance all sensor clocks by `dt` and read the sensors that are due.
    ///
    /// `specific_force` is the true non-gravitational acceleration in the
    /// world frame; the accelerometer reports its body-axis component.
    pub fn sample(
        &mut self,
        truth: &RocketState,
        specific_force: &Vector2<f64>,
        dt: f64,
    ) -> SensorReadings {
        let mut out = SensorReadings::default();

        if self.accel_clock.tick(dt) {
            let axial = frames::world_to_body(specific_force, truth.theta).x;
            out.accel = Some(self.accel.read(axial, &mut self.rng));
        }
        if self.gyro_clock.tick(dt) {
            out.gyro = Some(self.gyro.read(truth.omega, &mut self.rng));
        }
        if self.altimeter_clock.tick(dt) {
            out.altimeter = Some(self.altimeter.read(truth.y, &mut self.rng));
        }
        if self.gps_clock.tick(dt) {
            out.gps = Some(GpsFix {
                x: self.gps_pos.read(truth.x, &mut self.rng),
                y: self.gps_pos.read(truth.y, &mut self.rng),
                vx: self.gps_vel.read(truth.vx, &mut self.rng),
                vy: self.gps_vel.read(truth.vy, &mut self.rng),
            });
        }

        out
    }
}
