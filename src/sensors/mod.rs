pub mod clock;
pub mod simulator;

pub use clock::SampleClock;
pub use simulator::{GpsFix, SensorReadings, SensorSimulator};
