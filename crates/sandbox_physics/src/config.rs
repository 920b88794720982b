//! Simulation space configuration

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Simulation space configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector in world units per second squared (Y points down)
    pub gravity: [f32; 2],

    /// Fixed timestep, advanced exactly once per tick
    pub timestep: f32,

    /// Solver iterations for velocity
    pub velocity_iterations: usize,

    /// World units per meter. Rapier scales its internal tolerances by this.
    pub length_unit: f32,

    /// Enable sleeping for inactive bodies
    pub sleeping_enabled: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, 900.0],
            timestep: 1.0 / 60.0,
            velocity_iterations: 4,
            length_unit: 100.0,
            sleeping_enabled: true,
        }
    }
}

impl PhysicsConfig {
    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32) -> Self {
        self.gravity = [x, y];
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Reject values the integrator cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.velocity_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "velocity_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.length_unit.is_finite() && self.length_unit > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "length_unit must be positive, got {}",
                self.length_unit
            )));
        }
        Ok(())
    }
}
