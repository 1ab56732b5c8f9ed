// ---------------------------------------------------------------------------
// Per-sensor sample clock
// ---------------------------------------------------------------------------

/// Relative slack on the period so that summing `dt` in floating point does
/// not delay an emission by a whole step (e.g. ten 0.01 s steps vs 0.1 s).
const PERIOD_TOLERANCE: f64 = 1e-9;

/// Accumulates elapsed simulation time and fires once per sample period.
///
/// The overshoot past the period is carried into the next interval, so the
/// long-run emission rate matches the configured rate exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleClock {
    period: f64,
    elapsed: f64,
}

impl SampleClock {
    /// `rate` in Hz, must be positive (checked by `SensorConfig::validate`).
    pub fn new(rate: f64) -> Self {
        Self { period: 1.0 / rate, elapsed: 0.0 }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Advance by `dt`; returns `true` when a reading is due this step.
    pub fn tick(&mut self, dt: f64) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.period * (1.0 - PERIOD_TOLERANCE) {
            return false;
        }
        self.elapsed -= self.period;
        // Sensor faster than the loop: at most one reading per step
        if self.elapsed >= self.period {
            self.elapsed %= self.period;
        }
        true
    }
}
