use std::fmt;

use super::record::FlightRecord;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of flight events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Burnout,
    Apogee,
    GroundCrossing,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Burnout => "burnout",
            EventKind::Apogee => "apogee",
            EventKind::GroundCrossing => "ground crossing",
        };
        f.write_str(name)
    }
}

/// A discrete event that occurred during the flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    pub record: FlightRecord,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive records and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &FlightRecord, current: &FlightRecord) -> Option<EventKind>;
}

/// Detects engine shutdown (thrust dropping to zero).
#[derive(Debug, Default)]
pub struct BurnoutDetector {
    fired: bool,
}

impl EventDetector for BurnoutDetector {
    fn check(&mut self, prev: &FlightRecord, current: &FlightRecord) -> Option<EventKind> {
        if !self.fired && prev.thrust > 0.0 && current.thrust <= 0.0 {
            self.fired = true;
            Some(EventKind::Burnout)
        } else {
            None
        }
    }
}

/// Detects apogee (vertical velocity going from positive to non-positive).
#[derive(Debug)]
pub struct ApogeeDetector {
    pub min_altitude: f64,
    fired: bool,
}

impl Default for ApogeeDetector {
    fn default() -> Self {
        Self { min_altitude: 1.0, fired: false }
    }
}

impl EventDetector for ApogeeDetector {
    fn check(&mut self, prev: &FlightRecord, current: &FlightRecord) -> Option<EventKind> {
        if !self.fired
            && prev.state.vy > 0.0
            && current.state.vy <= 0.0
            && current.state.y > self.min_altitude
        {
            self.fired = true;
            Some(EventKind::Apogee)
        } else {
            None
        }
    }
}

/// Detects the descent through ground level (y = 0).
#[derive(Debug, Default)]
pub struct GroundDetector {
    fired: bool,
}

impl EventDetector for GroundDetector {
    fn check(&mut self, prev: &FlightRecord, current: &FlightRecord) -> Option<EventKind> {
        if !self.fired && prev.state.y >= 0.0 && current.state.y < 0.0 && current.state.vy < 0.0 {
            self.fired = true;
            Some(EventKind::GroundCrossing)
        } else {
            None
        }
    }
}

/// Burnout, apogee and ground crossing, in that order.
pub fn default_detectors() -> Vec<Box<dyn EventDetector>> {
    vec![
        Box::new(BurnoutDetector::default()),
        Box::new(ApogeeDetector::default()),
        Box::new(GroundDetector::default()),
    ]
}
