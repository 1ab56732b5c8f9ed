pub mod aerodynamics;
pub mod frames;
pub mod gravity;

pub use aerodynamics::{drag_force, drag_jacobian};
pub use frames::{body_to_world, clamp, rotation_matrix, world_to_body, wrap_angle};
pub use gravity::{gravity_accel, gravity_force};
