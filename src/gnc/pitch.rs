use crate::config::ControllerConfig;
use crate::dynamics::state::GncCommand;
use crate::estimation::Estimate;
use crate::physics::frames::wrap_angle;

use super::controller::Controller;
use super::pid::Pid;

// ---------------------------------------------------------------------------
// Pitch hold: PID on the estimated pitch angle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PitchController {
    pub target_theta: f64,
    pid: Pid,
}

impl PitchController {
    pub fn new(cfg: &ControllerConfig) -> Self {
        Self {
            target_theta: cfg.target_theta,
            pid: Pid::new(cfg.kp, cfg.ki, cfg.kd, cfg.integral_limit)
                .with_output_limits(cfg.output_min, cfg.output_max),
        }
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    pub fn update(&mut self, estimate: &Estimate, dt: f64) -> GncCommand {
        let error = wrap_angle(self.target_theta - estimate.theta);
        GncCommand {
            gimbal: self.pid.update(error, dt),
        }
    }
}

impl Default for PitchController {
    fn default() -> Self {
        Self::new(&ControllerConfig::default())
    }
}

impl Controller for PitchController {
    fn command(&mut self, estimate: &Estimate, dt: f64) -> GncCommand {
        self.update(estimate, dt)
    }

    fn reset(&mut self) {
        self.pid.reset();
    }

    fn name(&self) -> &str {
        "PitchController"
    }
}
