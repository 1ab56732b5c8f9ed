pub mod planar;
pub mod state;

pub use planar::{derivatives, jacobian, specific_force, Actuation};
pub use state::{GncCommand, RocketState, StateVector, G0};
