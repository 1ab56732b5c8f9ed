pub mod event;
pub mod integrator;
pub mod record;
pub mod runner;

pub use event::{EventKind, SimEvent};
pub use integrator::{rk4_step, step_state};
pub use record::{FlightLog, FlightRecord};
pub use runner::{simulate, simulate_with, FlightLoop};
