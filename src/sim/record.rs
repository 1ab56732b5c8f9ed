use crate::dynamics::state::RocketState;
use crate::estimation::Estimate;
use crate::sensors::SensorReadings;

use super::event::SimEvent;

// ---------------------------------------------------------------------------
// Per-step snapshot
// ---------------------------------------------------------------------------

/// Everything the flight loop produced during one step.
///
/// `time` and `state` are taken after integration. Sensor channels read
/// 0.0 on steps where the sensor was not due.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightRecord {
    pub time: f64,
    pub state: RocketState,
    pub thrust: f64,    // N
    pub gimbal: f64,    // rad, as applied (clamped)

    pub accel: f64,
    pub gyro: f64,
    pub altimeter: f64,
    pub gps_x: f64,
    pub gps_y: f64,
    pub gps_vx: f64,
    pub gps_vy: f64,

    pub estimate: Estimate,
    /// A filter update was skipped for numerical reasons this step.
    pub degraded: bool,
}

impl FlightRecord {
    pub(crate) fn with_readings(mut self, readings: &SensorReadings) -> Self {
        self.accel = readings.accel.unwrap_or(0.0);
        self.gyro = readings.gyro.unwrap_or(0.0);
        self.altimeter = readings.altimeter.unwrap_or(0.0);
        if let Some(fix) = readings.gps {
            self.gps_x = fix.x;
            self.gps_y = fix.y;
            self.gps_vx = fix.vx;
            self.gps_vy = fix.vy;
        }
        self
    }

    pub fn altitude_error(&self) -> f64 {
        self.estimate.y - self.state.y
    }

    pub fn pitch_error(&self) -> f64 {
        self.estimate.theta - self.state.theta
    }
}

// ---------------------------------------------------------------------------
// Append-only flight log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightLog {
    records: Vec<FlightRecord>,
    events: Vec<SimEvent>,
}

impl FlightLog {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            records: Vec::with_capacity(n),
            events: Vec::new(),
        }
    }

    pub fn append(&mut self, record: FlightRecord) {
        self.records.push(record);
    }

    pub(crate) fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&FlightRecord> {
        self.records.last()
    }

    pub fn degraded_steps(&self) -> usize {
        self.records.iter().filter(|r| r.degraded).count()
    }

    fn column(&self, f: impl Fn(&FlightRecord) -> f64) -> Vec<f64> {
        self.records.iter().map(f).collect()
    }

    // --- Column accessors for plotting and export ---

    pub fn times(&self) -> Vec<f64> { self.column(|r| r.time) }
    pub fn x(&self) -> Vec<f64> { self.column(|r| r.state.x) }
    pub fn y(&self) -> Vec<f64> { self.column(|r| r.state.y) }
    pub fn vx(&self) -> Vec<f64> { self.column(|r| r.state.vx) }
    pub fn vy(&self) -> Vec<f64> { self.column(|r| r.state.vy) }
    pub fn theta(&self) -> Vec<f64> { self.column(|r| r.state.theta) }
    pub fn omega(&self) -> Vec<f64> { self.column(|r| r.state.omega) }
    pub fn mass(&self) -> Vec<f64> { self.column(|r| r.state.mass) }
    pub fn thrust(&self) -> Vec<f64> { self.column(|r| r.thrust) }
    pub fn gimbal(&self) -> Vec<f64> { self.column(|r| r.gimbal) }

    pub fn estimated_x(&self) -> Vec<f64> { self.column(|r| r.estimate.x) }
    pub fn estimated_y(&self) -> Vec<f64> { self.column(|r| r.estimate.y) }
    pub fn estimated_vx(&self) -> Vec<f64> { self.column(|r| r.estimate.vx) }
    pub fn estimated_vy(&self) -> Vec<f64> { self.column(|r| r.estimate.vy) }
    pub fn estimated_theta(&self) -> Vec<f64> { self.column(|r| r.estimate.theta) }
    pub fn estimated_omega(&self) -> Vec<f64> { self.column(|r| r.estimate.omega) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::GpsFix;

    fn record(time: f64, y: f64) -> FlightRecord {
        FlightRecord {
            time,
            state: RocketState { y, ..RocketState::at_rest(80.0) },
            ..FlightRecord::default()
        }
    }

    #[test]
    fn columns_follow_append_order() {
        let mut log = FlightLog::default();
        log.append(record(0.01, 1.0));
        log.append(record(0.02, 2.5));
        assert_eq!(log.len(), 2);
        assert_eq!(log.times(), vec![0.01, 0.02]);
        assert_eq!(log.y(), vec![1.0, 2.5]);
        assert_eq!(log.mass(), vec![80.0, 80.0]);
    }

    #[test]
    fn missing_readings_default_to_zero() {
        let readings = SensorReadings {
            gyro: Some(0.25),
            gps: Some(GpsFix { x: 1.0, y: 2.0, vx: 3.0, vy: 4.0 }),
            ..SensorReadings::default()
        };
        let r = record(0.0, 0.0).with_readings(&readings);
        assert_eq!(r.accel, 0.0);
        assert_eq!(r.altimeter, 0.0);
        assert_eq!(r.gyro, 0.25);
        assert_eq!((r.gps_x, r.gps_y, r.gps_vx, r.gps_vy), (1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn counts_degraded_steps() {
        let mut log = FlightLog::with_capacity(3);
        log.append(record(0.01, 0.0));
        log.append(FlightRecord { degraded: true, ..record(0.02, 0.0) });
        assert_eq!(log.degraded_steps(), 1);
    }
}
