//! Pivot joints used to drag bodies around

use glam::Vec2;
use rapier2d::prelude as rapier;

use crate::math;

/// Handle to a joint in the simulation space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointHandle(pub(crate) rapier::ImpulseJointHandle);

impl JointHandle {
    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::ImpulseJointHandle {
        self.0
    }
}

/// Rigidity of the pivot motors, `dt·stiffness + damping` (1/s).
///
/// A held load `a` leaves the pivot `a / stiffness` short of its target.
const RIGIDITY: f32 = 1.0e5;

/// A pivot pinning `anchor2` on the second body onto `anchor1` on the first.
///
/// Both linear axes are driven by stiff position motors whose only limit is
/// `max_force`, so the pivot holds like a rigid point constraint while the
/// second body keeps rotating freely about it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotJointDesc {
    /// Anchor in the first body's local frame
    pub anchor1: Vec2,
    /// Anchor in the second body's local frame
    pub anchor2: Vec2,
    /// Upper bound on the correcting force
    pub max_force: f32,
    /// Fraction of positional error left uncorrected after one second
    pub error_bias: f32,
}

impl PivotJointDesc {
    /// Pivot with unbounded force and the default error bias
    pub fn new(anchor1: Vec2, anchor2: Vec2) -> Self {
        Self {
            anchor1,
            anchor2,
            max_force: f32::MAX,
            error_bias: 0.85f32.powf(60.0),
        }
    }

    /// Set max force
    pub fn with_max_force(mut self, max_force: f32) -> Self {
        self.max_force = max_force.max(0.0);
        self
    }

    /// Set error bias
    pub fn with_error_bias(mut self, error_bias: f32) -> Self {
        self.error_bias = error_bias;
        self
    }

    /// Fraction of the positional error removed by one step of `dt` seconds
    pub fn correction_per_step(&self, dt: f32) -> f32 {
        1.0 - self.error_bias.clamp(0.0, 0.999_999).powf(dt)
    }

    /// Motor constants `(stiffness, damping)` for a step of `dt` seconds
    pub fn motor(&self, dt: f32) -> (f32, f32) {
        let fraction = self.correction_per_step(dt);
        let stiffness = fraction / dt * RIGIDITY;
        let damping = RIGIDITY * (1.0 - fraction);
        (stiffness, damping)
    }

    pub(crate) fn to_rapier(&self, dt: f32) -> rapier::GenericJoint {
        let (stiffness, damping) = self.motor(dt);
        let mut builder = rapier::GenericJointBuilder::new(rapier::JointAxesMask::empty())
            .local_anchor1(math::point(self.anchor1))
            .local_anchor2(math::point(self.anchor2))
            .contacts_enabled(false);

        for axis in [rapier::JointAxis::LinX, rapier::JointAxis::LinY] {
            builder = builder
                .motor_model(axis, rapier::MotorModel::AccelerationBased)
                .motor_position(axis, 0.0, stiffness, damping)
                .motor_max_force(axis, self.max_force);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn default_bias_removes_fifteen_percent_per_step() {
        let desc = PivotJointDesc::new(Vec2::ZERO, Vec2::ZERO);
        assert_relative_eq!(desc.correction_per_step(DT), 0.15, epsilon = 1e-4);
    }

    #[test]
    fn motor_corrects_at_the_biased_rate() {
        let desc = PivotJointDesc::new(Vec2::ZERO, Vec2::ZERO);
        let (stiffness, damping) = desc.motor(DT);
        // Positional correction applied by an acceleration-based motor per second.
        let rate = stiffness / (DT * stiffness + damping);
        assert_relative_eq!(rate * DT, desc.correction_per_step(DT), max_relative = 1e-4);
    }

    #[test]
    fn gravity_barely_stretches_the_pivot() {
        let (stiffness, _) = PivotJointDesc::new(Vec2::ZERO, Vec2::ZERO).motor(DT);
        assert!(900.0 / stiffness < 0.01);
    }

    #[test]
    fn zero_bias_corrects_fully() {
        let desc = PivotJointDesc::new(Vec2::ZERO, Vec2::ZERO).with_error_bias(0.0);
        assert_relative_eq!(desc.correction_per_step(DT), 1.0);
        let (_, damping) = desc.motor(DT);
        assert_relative_eq!(damping, 0.0);
    }

    #[test]
    fn negative_max_force_clamps_to_zero() {
        let desc = PivotJointDesc::new(Vec2::ZERO, Vec2::ONE).with_max_force(-5.0);
        assert_eq!(desc.max_force, 0.0);
    }
}
