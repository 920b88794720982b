//! Sandbox Physics - Rapier 2D simulation space
//!
//! This crate wraps Rapier 2D into the simulation space the sandbox runs on:
//! bodies and shapes with per-shape materials, a begin-contact handler
//! protocol keyed by collision type, a force-limited pivot joint for dragging,
//! nearest-shape point queries and collider outlines for debug drawing.
//!
//! The world uses screen-like coordinates: the Y axis points down and the
//! default gravity is `(0, 900)`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 PhysicsWorld                     │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────┐ │
//! │  │ RigidBodySet│  │ ColliderSet │  │ Queries │ │
//! │  └─────────────┘  └─────────────┘  └─────────┘ │
//! │  ┌─────────────────────────────────────────────┐│
//! │  │           PhysicsPipeline                   ││
//! │  │  (one fixed step per call)                  ││
//! │  └─────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────┘
//!                        │ started contacts
//!                        ▼
//!              ┌────────────────────┐
//!              │ CollisionHandlers  │
//!              │ (pair / wildcard)  │
//!              └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sandbox_physics::prelude::*;
//! use glam::Vec2;
//!
//! let mut space = PhysicsWorld::new(PhysicsConfig::default());
//!
//! let (body, _shape) = space.create_body_with_collider(
//!     RigidBodyDesc::dynamic().with_position(Vec2::new(500.0, 100.0)),
//!     ColliderDesc::new(ColliderShape::circle(12.0))
//!         .with_mass(10.0)
//!         .with_collision_type(CollisionType::BALL),
//! )?;
//!
//! space.step();
//! ```

pub mod body;
pub mod collider;
pub mod collision;
pub mod config;
pub mod debug;
pub mod error;
pub mod events;
pub mod joint;
pub mod material;
mod math;
pub mod query;
pub mod world;

pub mod prelude {
    //! Common imports for the simulation space
    pub use crate::body::{
        moment_for_box, moment_for_circle, BodyState, RigidBodyDesc, RigidBodyHandle, RigidBodyType,
    };
    pub use crate::collider::{ColliderDesc, ColliderHandle, ColliderShape};
    pub use crate::collision::{CollisionHandler, CollisionHandlers, CollisionType};
    pub use crate::config::PhysicsConfig;
    pub use crate::debug::DebugDraw;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{CollisionEvent, CollisionEventType, ContactData};
    pub use crate::joint::{JointHandle, PivotJointDesc};
    pub use crate::material::{CombineRule, PhysicsMaterial};
    pub use crate::query::PointQueryHit;
    pub use crate::world::PhysicsWorld;
}

pub use prelude::*;
