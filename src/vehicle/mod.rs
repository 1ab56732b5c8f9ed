pub mod rocket;

pub use rocket::{RocketBuilder, RocketConfig};
