use std::f64::consts::PI;

use crate::dynamics::state::G0;
use crate::error::{self, ConfigError};

// ---------------------------------------------------------------------------
// Rocket definition (single stage, single gimballed engine)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RocketConfig {
    pub dry_mass: f64,            // kg
    pub fuel_mass: f64,           // kg
    pub max_thrust: f64,          // N
    pub isp: f64,                 // s
    pub length: f64,              // m
    pub diameter: f64,            // m
    pub drag_coeff: f64,          // Cd, dimensionless
    pub moment_of_inertia: f64,   // kg·m^2 about the CG
    pub cg_offset: f64,           // m from nose
    pub cp_offset: f64,           // m from nose
    pub max_gimbal_angle: f64,    // rad
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            dry_mass: 50.0,
            fuel_mass: 30.0,
            max_thrust: 1200.0,
            isp: 220.0,
            length: 2.0,
            diameter: 0.15,
            drag_coeff: 0.4,
            moment_of_inertia: 80.0,
            cg_offset: 0.8,
            cp_offset: 1.2,
            max_gimbal_angle: 5.0_f64.to_radians(),
        }
    }
}

impl RocketConfig {
    /// Cross-sectional area used for drag, m^2.
    pub fn reference_area(&self) -> f64 {
        PI * (self.diameter / 2.0).powi(2)
    }

    /// Wet mass at ignition.
    pub fn total_mass(&self) -> f64 {
        self.dry_mass + self.fuel_mass
    }

    /// Propellant mass flow at full thrust: mdot = F / (Isp * g0)
    pub fn mass_flow(&self) -> f64 {
        self.max_thrust / (self.isp * G0)
    }

    /// Time to exhaust all fuel at full thrust.
    pub fn fuel_burn_time(&self) -> f64 {
        if self.max_thrust > 0.0 {
            self.fuel_mass / self.mass_flow()
        } else {
            0.0
        }
    }

    /// Thrust-to-weight ratio at ignition for local gravity `g`.
    pub fn twr(&self, g: f64) -> f64 {
        self.max_thrust / (self.total_mass() * g)
    }

    /// Ideal delta-v (Tsiolkovsky) if all fuel is burned.
    pub fn delta_v(&self) -> f64 {
        self.isp * G0 * (self.total_mass() / self.dry_mass).ln()
    }

    /// Lever arm between centre of pressure and centre of gravity.
    pub fn moment_arm(&self) -> f64 {
        self.cp_offset - self.cg_offset
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        error::positive("rocket.dry_mass", self.dry_mass)?;
        error::non_negative("rocket.fuel_mass", self.fuel_mass)?;
        error::non_negative("rocket.max_thrust", self.max_thrust)?;
        error::positive("rocket.isp", self.isp)?;
        error::positive("rocket.length", self.length)?;
        error::positive("rocket.diameter", self.diameter)?;
        error::non_negative("rocket.drag_coeff", self.drag_coeff)?;
        error::positive("rocket.moment_of_inertia", self.moment_of_inertia)?;
        error::non_negative("rocket.cg_offset", self.cg_offset)?;
        error::non_negative("rocket.cp_offset", self.cp_offset)?;
        error::non_negative("rocket.max_gimbal_angle", self.max_gimbal_angle)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rocket builder
// ---------------------------------------------------------------------------

pub struct RocketBuilder {
    rocket: RocketConfig,
}

impl RocketBuilder {
    pub fn new() -> Self {
        Self { rocket: RocketConfig::default() }
    }

    pub fn dry_mass(mut self, v: f64) -> Self { self.rocket.dry_mass = v; self }
    pub fn fuel_mass(mut self, v: f64) -> Self { self.rocket.fuel_mass = v; self }
    pub fn max_thrust(mut self, v: f64) -> Self { self.rocket.max_thrust = v; self }
    pub fn isp(mut self, v: f64) -> Self { self.rocket.isp = v; self }
    pub fn length(mut self, v: f64) -> Self { self.rocket.length = v; self }
    pub fn diameter(mut self, v: f64) -> Self { self.rocket.diameter = v; self }
    pub fn drag_coeff(mut self, v: f64) -> Self { self.rocket.drag_coeff = v; self }
    pub fn moment_of_inertia(mut self, v: f64) -> Self { self.rocket.moment_of_inertia = v; self }
    pub fn cg_offset(mut self, v: f64) -> Self { self.rocket.cg_offset = v; self }
    pub fn cp_offset(mut self, v: f64) -> Self { self.rocket.cp_offset = v; self }
    pub fn max_gimbal_angle(mut self, v: f64) -> Self { self.rocket.max_gimbal_angle = v; self }

    pub fn build(self) -> RocketConfig {
        self.rocket
    }
}

impl Default for RocketBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_quantities() {
        let r = RocketConfig::default();
        assert_eq!(r.total_mass(), 80.0);
        assert!((r.reference_area() - 0.017_671_458_676_442_587).abs() < 1e-15);
        assert!((r.moment_arm() - 0.4).abs() < 1e-12);
        assert!((r.twr(9.81) - 1200.0 / (80.0 * 9.81)).abs() < 1e-12);
    }

    #[test]
    fn fuel_outlasts_default_burn() {
        let r = RocketConfig::default();
        // ~0.556 kg/s -> 30 kg lasts ~54 s
        assert!(r.fuel_burn_time() > 10.0);
        assert!(r.delta_v() > 0.0);
    }

    #[test]
    fn builder_overrides_single_field() {
        let r = RocketBuilder::new().dry_mass(100.0).build();
        assert_eq!(r.dry_mass, 100.0);
        assert_eq!(r.total_mass(), 130.0);
        assert_eq!(r.max_thrust, RocketConfig::default().max_thrust);
    }

    #[test]
    fn rejects_zero_dry_mass() {
        let r = RocketBuilder::new().dry_mass(0.0).build();
        assert!(r.validate().is_err());
    }
}
