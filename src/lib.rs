//! Planar closed-loop rocket flight simulation.
//!
//! Truth dynamics are integrated with RK4, sampled by a noisy sensor suite,
//! fused by an extended Kalman filter and flown by a PID pitch controller.
//! See [`sim::simulate`] for the one-call entry point.

pub mod config;
pub mod dynamics;
pub mod error;
pub mod estimation;
pub mod gnc;
pub mod io;
pub mod physics;
pub mod sensors;
pub mod sim;
pub mod vehicle;

pub use config::SimulationConfig;
pub use error::ConfigError;
pub use sim::{simulate, simulate_with, FlightLog, FlightLoop, FlightRecord};
