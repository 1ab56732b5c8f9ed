pub mod controller;
pub mod pid;
pub mod pitch;

pub use controller::Controller;
pub use pid::Pid;
pub use pitch::PitchController;
