use crate::dynamics::state::GncCommand;
use crate::estimation::Estimate;

/// Trait for flight controllers.
///
/// Implement this to plug a custom controller into the flight loop. The
/// loop only ever hands the controller the filter estimate, never the truth.
pub trait Controller {
    /// Compute the gimbal command for the next step.
    fn command(&mut self, estimate: &Estimate, dt: f64) -> GncCommand;

    /// Reset controller internal state (e.g., PID integrators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn command(&mut self, estimate: &Estimate, dt: f64) -> GncCommand {
        (**self).command(estimate, dt)
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
