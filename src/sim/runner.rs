use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::dynamics::planar::{self, Actuation};
use crate::dynamics::state::{GncCommand, RocketState};
use crate::error::ConfigError;
use crate::estimation::Ekf;
use crate::gnc::{Controller, PitchController};
use crate::sensors::SensorSimulator;

use super::event::{default_detectors, EventDetector, SimEvent};
use super::integrator::step_state;
use super::record::{FlightLog, FlightRecord};

// ---------------------------------------------------------------------------
// Closed-loop flight
// ---------------------------------------------------------------------------

/// Owns every component of the closed loop and advances them in lockstep.
///
/// Each step: integrate truth with the previous command, sample sensors,
/// predict and update the filter, then ask the controller for the command
/// used on the *next* step.
pub struct FlightLoop<C: Controller, R: Rng = StdRng> {
    config: SimulationConfig,
    state: RocketState,
    command: GncCommand,
    sensors: SensorSimulator<R>,
    ekf: Ekf,
    controller: C,
    detectors: Vec<Box<dyn EventDetector>>,
    prev: FlightRecord,
    step: usize,
    n_steps: usize,
    log: FlightLog,
}

impl<C: Controller, R: Rng> FlightLoop<C, R> {
    /// Validate the configuration and build all components at launch.
    pub fn new(config: SimulationConfig, controller: C, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let state = config.initial_state();
        let sensors = SensorSimulator::new(&config.sensor, rng)?;
        let ekf = Ekf::new(
            &state,
            &config.kalman,
            &config.sensor,
            &config.rocket,
            &config.environment,
        );
        let n_steps = config.n_steps();
        let pad = FlightRecord {
            state,
            estimate: ekf.estimate(),
            ..FlightRecord::default()
        };

        Ok(Self {
            state,
            command: GncCommand::default(),
            sensors,
            ekf,
            controller,
            detectors: default_detectors(),
            prev: pad,
            step: 0,
            n_steps,
            log: FlightLog::with_capacity(n_steps),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &RocketState {
        &self.state
    }

    pub fn ekf(&self) -> &Ekf {
        &self.ekf
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn log(&self) -> &FlightLog {
        &self.log
    }

    /// Steps taken so far.
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.n_steps
    }

    /// Advance one fixed step and return its record (also appended to the log).
    pub fn step(&mut self) -> FlightRecord {
        let dt = self.config.dt;
        let t = self.step as f64 * dt;
        let burn_flag = t < self.config.t_burn;
        let rocket = &self.config.rocket;
        let env = &self.config.environment;

        // 1. Truth
        let act = Actuation::resolve(&self.state, &self.command, burn_flag, rocket);
        let next = step_state(&self.state, t, dt, rocket.dry_mass, |_, s| {
            planar::derivatives(s, &act, rocket, env)
        });
        self.state = next;

        // 2. Sensors
        let f_specific = planar::specific_force(&self.state, &act, rocket, env);
        let readings = self.sensors.sample(&self.state, &f_specific, dt);

        // 3. Filter
        self.ekf.predict(&self.command, burn_flag, t, dt);
        let report = self.ekf.update(&readings);
        let estimate = self.ekf.estimate();

        // 4. Control (applied next step)
        self.command = self.controller.command(&estimate, dt);

        self.step += 1;
        let record = FlightRecord {
            time: self.step as f64 * dt,
            state: self.state,
            thrust: act.thrust,
            gimbal: act.gimbal,
            estimate,
            degraded: report.degraded(),
            ..FlightRecord::default()
        }
        .with_readings(&readings);

        if record.degraded {
            debug!(t = record.time, singular = report.singular, "degraded filter step");
        }
        self.detect_events(&record);
        self.log.append(record);
        self.prev = record;
        record
    }

    fn detect_events(&mut self, record: &FlightRecord) {
        for det in self.detectors.iter_mut() {
            if let Some(kind) = det.check(&self.prev, record) {
                debug!(
                    t = record.time,
                    altitude = record.state.y,
                    speed = record.state.speed(),
                    "{kind}"
                );
                self.log.push_event(SimEvent {
                    time: record.time,
                    kind,
                    record: *record,
                });
            }
        }
    }

    /// Run the remaining steps and hand back the complete log.
    pub fn run(mut self) -> FlightLog {
        let rocket = &self.config.rocket;
        info!(
            controller = self.controller.name(),
            twr = rocket.twr(self.config.environment.gravity),
            steps = self.n_steps,
            dt = self.config.dt,
            "starting flight"
        );

        while !self.is_finished() {
            self.step();
        }

        let apogee = self
            .log
            .records()
            .iter()
            .map(|r| r.state.y)
            .fold(f64::NEG_INFINITY, f64::max);
        info!(
            steps = self.log.len(),
            apogee,
            degraded = self.log.degraded_steps(),
            "flight complete"
        );
        self.log
    }
}

// ---------------------------------------------------------------------------
// Convenience entry points
// ---------------------------------------------------------------------------

/// Simulate with a custom controller and a sensor RNG seeded from the config.
pub fn simulate_with<C: Controller>(
    config: &SimulationConfig,
    controller: C,
) -> Result<FlightLog, ConfigError> {
    let rng = StdRng::seed_from_u64(config.seed);
    Ok(FlightLoop::new(config.clone(), controller, rng)?.run())
}

/// Simulate with the default PitchController (convenience wrapper).
pub fn simulate(config: &SimulationConfig) -> Result<FlightLog, ConfigError> {
    simulate_with(config, PitchController::new(&config.controller))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvironmentConfig, InitialConditions, KalmanConfig, SensorConfig};
    use crate::estimation::Estimate;
    use crate::sim::event::EventKind;
    use crate::vehicle::RocketConfig;

    struct Constant(f64);

    impl Controller for Constant {
        fn command(&mut self, _estimate: &Estimate, _dt: f64) -> GncCommand {
            GncCommand { gimbal: self.0 }
        }
    }

    fn short(t_end: f64) -> SimulationConfig {
        SimulationConfig { t_end, ..SimulationConfig::default() }
    }

    #[test]
    fn default_run_has_expected_length() {
        let cfg = SimulationConfig::default();
        assert!((cfg.rocket.twr(cfg.environment.gravity) - 1.529).abs() < 1e-3);
        let log = simulate(&cfg).unwrap();
        assert_eq!(log.len(), 3000);
        let last = log.last().unwrap();
        assert!((last.time - 30.0).abs() < 1e-9);
        assert!(log.y().iter().all(|y| y.is_finite()));
    }

    #[test]
    fn engine_off_free_fall() {
        let cfg = SimulationConfig {
            rocket: RocketConfig { fuel_mass: 0.0, ..RocketConfig::default() },
            environment: EnvironmentConfig { air_density: 0.0, ..EnvironmentConfig::default() },
            ..SimulationConfig::default()
        };
        let log = simulate(&cfg).unwrap();
        let last = log.last().unwrap();
        let expected = -0.5 * 9.81 * 30.0 * 30.0;
        assert!((last.state.y - expected).abs() < 1e-6, "y = {}", last.state.y);
        assert_eq!(last.state.x, 0.0);
        assert!(log.thrust().iter().all(|&t| t == 0.0));
    }

    #[test]
    fn pitch_disturbance_is_corrected_during_burn() {
        let cfg = SimulationConfig {
            initial: InitialConditions { theta: 0.1, ..Default::default() },
            ..SimulationConfig::default()
        };
        let log = simulate(&cfg).unwrap();
        let max_abs_theta = |from: f64, to: f64| {
            log.records()
                .iter()
                .filter(|r| r.time >= from && r.time <= to)
                .map(|r| r.state.theta.abs())
                .fold(0.0_f64, f64::max)
        };
        let early = max_abs_theta(0.0, 0.5);
        let settled = max_abs_theta(4.0, 10.0);
        assert!(early > 0.08, "disturbance should still be visible, got {early}");
        assert!(settled < 0.05, "pitch should settle near vertical, got {settled}");
        assert!(settled < early);
    }

    #[test]
    fn control_has_one_step_latency_and_is_clamped() {
        let cfg = short(0.05);
        let rng = StdRng::seed_from_u64(7);
        let mut fl = FlightLoop::new(cfg.clone(), Constant(1.0), rng).unwrap();
        let first = fl.step();
        let second = fl.step();
        assert_eq!(first.gimbal, 0.0);
        assert_eq!(second.gimbal, cfg.rocket.max_gimbal_angle);
        assert_eq!(fl.steps_taken(), 2);
    }

    #[test]
    fn engine_cuts_at_burn_time() {
        let log = simulate(&short(12.0)).unwrap();
        let records = log.records();
        // Step i starts at i * dt; the last burning step starts just before 10 s
        assert_eq!(records[999].thrust, 1200.0);
        assert_eq!(records[1000].thrust, 0.0);
        let burnout = log.events().iter().find(|e| e.kind == EventKind::Burnout);
        assert!(burnout.is_some_and(|e| (e.time - 10.01).abs() < 1e-9));
    }

    #[test]
    fn events_in_flight_order() {
        let log = simulate(&SimulationConfig::default()).unwrap();
        let kinds: Vec<EventKind> = log.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EventKind::Burnout, EventKind::Apogee, EventKind::GroundCrossing]
        );
    }

    #[test]
    fn same_seed_same_flight() {
        let cfg = short(3.0);
        let a = simulate(&cfg).unwrap();
        let b = simulate(&cfg).unwrap();
        assert_eq!(a, b);

        let c = simulate(&SimulationConfig { seed: 43, ..cfg }).unwrap();
        assert_ne!(a.records(), c.records());
    }

    #[test]
    fn singular_filter_steps_are_flagged() {
        let cfg = SimulationConfig {
            sensor: SensorConfig::ideal(),
            kalman: KalmanConfig {
                process_noise_pos: 0.0,
                process_noise_vel: 0.0,
                process_noise_theta: 0.0,
                process_noise_omega: 0.0,
                initial_pos_std: 0.0,
                initial_vel_std: 0.0,
                initial_theta_std: 0.0,
                initial_omega_std: 0.0,
                ..KalmanConfig::default()
            },
            ..short(2.0)
        };
        let log = simulate(&cfg).unwrap();
        assert!(log.records()[0].degraded);
        assert_eq!(log.degraded_steps(), log.len());
        // With a perfect model and no fusion, the filter coasts on the truth
        for r in log.records() {
            assert!((r.estimate.y - r.state.y).abs() < 1e-9);
            assert!((r.estimate.theta - r.state.theta).abs() < 1e-12);
        }
    }

    #[test]
    fn estimate_tracks_truth() {
        let log = simulate(&SimulationConfig::default()).unwrap();
        let n = log.len() as f64;
        let rms_alt = (log.records().iter().map(|r| r.altitude_error().powi(2)).sum::<f64>() / n).sqrt();
        assert!(rms_alt < 5.0, "altitude RMS error {rms_alt}");
        assert_eq!(log.degraded_steps(), 0);
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = SimulationConfig { dt: 0.0, ..SimulationConfig::default() };
        assert!(simulate(&cfg).is_err());
    }
}
