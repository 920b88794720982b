//! Rigid body types and descriptors

use glam::Vec2;
use rapier2d::prelude as rapier;
use serde::{Deserialize, Serialize};

use crate::math;

/// Handle to a rigid body in the simulation space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub(crate) rapier::RigidBodyHandle);

impl RigidBodyHandle {
    /// Create from raw Rapier handle
    pub fn from_raw(handle: rapier::RigidBodyHandle) -> Self {
        Self(handle)
    }

    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::RigidBodyHandle {
        self.0
    }
}

/// Type of rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RigidBodyType {
    /// Static body - never moves, infinite mass
    Static,
    /// Dynamic body - fully simulated
    #[default]
    Dynamic,
    /// Kinematic body - moved by the caller, pushes dynamic bodies
    Kinematic,
}

impl From<RigidBodyType> for rapier::RigidBodyType {
    fn from(t: RigidBodyType) -> Self {
        match t {
            RigidBodyType::Static => rapier::RigidBodyType::Fixed,
            RigidBodyType::Dynamic => rapier::RigidBodyType::Dynamic,
            RigidBodyType::Kinematic => rapier::RigidBodyType::KinematicPositionBased,
        }
    }
}

impl From<rapier::RigidBodyType> for RigidBodyType {
    fn from(t: rapier::RigidBodyType) -> Self {
        match t {
            rapier::RigidBodyType::Fixed => RigidBodyType::Static,
            rapier::RigidBodyType::Dynamic => RigidBodyType::Dynamic,
            rapier::RigidBodyType::KinematicPositionBased
            | rapier::RigidBodyType::KinematicVelocityBased => RigidBodyType::Kinematic,
        }
    }
}

/// Moment of inertia of a solid disk about its center
pub fn moment_for_circle(mass: f32, radius: f32) -> f32 {
    0.5 * mass * radius * radius
}

/// Moment of inertia of a solid rectangular plate about its center
pub fn moment_for_box(mass: f32, width: f32, height: f32) -> f32 {
    mass * (width * width + height * height) / 12.0
}

/// Description for creating a rigid body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBodyDesc {
    /// Type of rigid body
    pub body_type: RigidBodyType,
    /// Initial position
    pub position: [f32; 2],
    /// Initial orientation in radians
    pub angle: f32,
    /// Initial linear velocity
    pub linear_velocity: [f32; 2],
    /// Initial angular velocity
    pub angular_velocity: f32,
    /// Gravity scale (0 = no gravity, 1 = normal, 2 = double)
    pub gravity_scale: f32,
    /// Linear damping
    pub linear_damping: f32,
    /// Angular damping
    pub angular_damping: f32,
    /// Enable continuous collision detection
    pub ccd_enabled: bool,
    /// Can this body sleep when inactive
    pub can_sleep: bool,
    /// User data (owning entity, etc.)
    pub user_data: u128,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            position: [0.0, 0.0],
            angle: 0.0,
            linear_velocity: [0.0, 0.0],
            angular_velocity: 0.0,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            ccd_enabled: false,
            can_sleep: true,
            user_data: 0,
        }
    }
}

impl RigidBodyDesc {
    /// Create a static body description
    pub fn fixed() -> Self {
        Self {
            body_type: RigidBodyType::Static,
            ..Default::default()
        }
    }

    /// Create a dynamic body description
    pub fn dynamic() -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            ..Default::default()
        }
    }

    /// Create a kinematic body description
    pub fn kinematic() -> Self {
        Self {
            body_type: RigidBodyType::Kinematic,
            ..Default::default()
        }
    }

    /// Set position
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position.to_array();
        self
    }

    /// Set orientation
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Set user data
    pub fn with_user_data(mut self, data: u128) -> Self {
        self.user_data = data;
        self
    }

    /// Build a Rapier rigid body builder
    pub(crate) fn to_rapier_builder(&self) -> rapier::RigidBodyBuilder {
        rapier::RigidBodyBuilder::new(self.body_type.into())
            .translation(math::vector(Vec2::from(self.position)))
            .rotation(self.angle)
            .linvel(math::vector(Vec2::from(self.linear_velocity)))
            .angvel(self.angular_velocity)
            .gravity_scale(self.gravity_scale)
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .ccd_enabled(self.ccd_enabled)
            .can_sleep(self.can_sleep)
            .user_data(self.user_data)
    }
}

/// Read-only snapshot of a body's physical state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Kind of body
    pub body_type: RigidBodyType,
    /// World position of the body origin
    pub position: Vec2,
    /// Orientation in radians
    pub angle: f32,
    /// Linear velocity
    pub linear_velocity: Vec2,
    /// Angular velocity
    pub angular_velocity: f32,
    /// Mass; infinite for static and kinematic bodies
    pub mass: f32,
    /// Moment of inertia; infinite for static and kinematic bodies
    pub moment: f32,
    /// User data attached at creation
    pub user_data: u128,
}

impl BodyState {
    pub(crate) fn from_rapier(body: &rapier::RigidBody) -> Self {
        let dynamic = body.is_dynamic();
        let props = body.mass_properties().local_mprops;
        Self {
            body_type: body.body_type().into(),
            position: math::from_vector(body.translation()),
            angle: body.rotation().angle(),
            linear_velocity: math::from_vector(body.linvel()),
            angular_velocity: body.angvel(),
            mass: if dynamic { body.mass() } else { f32::INFINITY },
            moment: if dynamic { props.principal_inertia() } else { f32::INFINITY },
            user_data: body.user_data,
        }
    }

    /// Whether forces and impulses move this body
    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic
    }
}
