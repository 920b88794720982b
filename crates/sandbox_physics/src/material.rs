//! Surface materials consumed by contact resolution

use rapier2d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Friction and restitution of a shape.
///
/// Restitution is not clamped: values above 1 add energy on every bounce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Friction coefficient, 0 or more
    pub friction: f32,
    /// Restitution (elasticity), 0 or more
    pub restitution: f32,
    /// How friction is combined between two shapes
    pub friction_combine: CombineRule,
    /// How restitution is combined between two shapes
    pub restitution_combine: CombineRule,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.7,
            restitution: 0.8,
            friction_combine: CombineRule::Multiply,
            restitution_combine: CombineRule::Multiply,
        }
    }
}

impl PhysicsMaterial {
    /// Create a new material
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.max(0.0),
            restitution: restitution.max(0.0),
            ..Default::default()
        }
    }

    /// Set restitution
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.max(0.0);
        self
    }

    /// Effective friction against another material
    pub fn combine_friction(&self, other: &PhysicsMaterial) -> f32 {
        let rule = self.friction_combine.max_priority(other.friction_combine);
        rule.combine(self.friction, other.friction)
    }

    /// Effective restitution against another material
    pub fn combine_restitution(&self, other: &PhysicsMaterial) -> f32 {
        let rule = self.restitution_combine.max_priority(other.restitution_combine);
        rule.combine(self.restitution, other.restitution)
    }
}

/// Rule for combining material properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CombineRule {
    /// Use the average of both values
    Average,
    /// Use the minimum value
    Min,
    /// Multiply the values
    #[default]
    Multiply,
    /// Use the maximum value
    Max,
}

impl CombineRule {
    /// The rule Rapier applies when two shapes disagree (highest wins)
    pub fn max_priority(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::Average => 0,
            Self::Min => 1,
            Self::Multiply => 2,
            Self::Max => 3,
        }
    }

    /// Combine two values using this rule
    pub fn combine(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Average => (a + b) * 0.5,
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            Self::Multiply => a * b,
        }
    }
}

impl From<CombineRule> for rapier::CoefficientCombineRule {
    fn from(rule: CombineRule) -> Self {
        match rule {
            CombineRule::Average => rapier::CoefficientCombineRule::Average,
            CombineRule::Min => rapier::CoefficientCombineRule::Min,
            CombineRule::Multiply => rapier::CoefficientCombineRule::Multiply,
            CombineRule::Max => rapier::CoefficientCombineRule::Max,
        }
    }
}
