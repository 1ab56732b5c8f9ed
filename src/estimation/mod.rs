pub mod ekf;
pub mod measurement;

pub use ekf::{Ekf, Estimate, UpdateReport, UpdateStatus};
pub use measurement::EstimateVector;
