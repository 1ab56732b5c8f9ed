use nalgebra::{SVector, Vector2};

use crate::physics::frames;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.80665; // standard gravity for Isp, m/s^2

/// Packed physical state: `[x, y, vx, vy, theta, omega, mass]`.
pub type StateVector = SVector<f64, 7>;

// ---------------------------------------------------------------------------
// Planar state: position, velocity, pitch, pitch rate, mass
// ---------------------------------------------------------------------------

/// Rocket state at a single instant.
///
/// x right, y up; theta 0 = nose up, positive clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RocketState {
    pub x: f64,        // m
    pub y: f64,        // m
    pub vx: f64,       // m/s
    pub vy: f64,       // m/s
    pub theta: f64,    // rad
    pub omega: f64,    // rad/s
    pub mass: f64,     // kg
}

impl RocketState {
    pub const LEN: usize = 7;

    /// Rocket sitting on the pad with the given mass.
    pub fn at_rest(mass: f64) -> Self {
        Self { mass, ..Self::default() }
    }

    pub fn to_array(&self) -> StateVector {
        StateVector::from([
            self.x, self.y, self.vx, self.vy,
            self.theta, self.omega, self.mass,
        ])
    }

    pub fn from_array(arr: &StateVector) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            vx: arr[2],
            vy: arr[3],
            theta: arr[4],
            omega: arr[5],
            mass: arr[6],
        }
    }

    pub fn pos(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn vel(&self) -> Vector2<f64> {
        Vector2::new(self.vx, self.vy)
    }

    pub fn speed(&self) -> f64 {
        self.vel().norm()
    }

    /// Nose direction in the world frame.
    pub fn axis(&self) -> Vector2<f64> {
        frames::nose_axis(self.theta)
    }
}

// ---------------------------------------------------------------------------
// GNC command output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GncCommand {
    pub gimbal: f64,   // thrust deflection from body axis, rad (positive = clockwise torque)
}
