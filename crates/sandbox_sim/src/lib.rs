//! Sandbox Sim - entities and the simulation loop
//!
//! [`Sandbox`] owns the simulation space, the entity registry, the camera,
//! the drag controller and the input queue, and runs them one fixed step per
//! tick. Entities are kept in a generational registry; their shapes point
//! back at them through user data, never by ownership.
//!
//! # Example
//!
//! ```ignore
//! use sandbox_sim::prelude::*;
//! use sandbox_view::MemorySink;
//! use glam::Vec2;
//!
//! let mut sandbox = Sandbox::new(SandboxConfig::load()?)?;
//! sandbox.spawn(EntityKind::Coin, Vec2::new(100.0, 100.0))?;
//! sandbox.spawn(EntityKind::Controllable, Vec2::new(100.0, 100.0))?;
//!
//! let mut sink = MemorySink::new();
//! sandbox.tick(&mut sink);
//! assert_eq!(sandbox.score(), 10);
//! ```

pub mod config;
pub mod drag;
pub mod entity;
pub mod error;
pub mod event_log;
pub mod input;
pub mod registry;
pub mod sandbox;

pub mod prelude {
    pub use crate::config::{
        BodyTuning, BoundaryConfig, DragConfig, EntityTuning, SandboxConfig, CONFIG_ENV,
        DEFAULT_CONFIG_FILE,
    };
    pub use crate::drag::DragController;
    pub use crate::entity::{Contact, Entity, EntityKind, Reaction};
    pub use crate::error::{ConfigError, SpawnError};
    pub use crate::event_log::{CsvEventLog, EventLog, LogEntry, MemoryEventLog};
    pub use crate::input::{InputEvent, InputQueue, InputState, Key, PointerButton};
    pub use crate::registry::{EntityHandle, EntityRegistry};
    pub use crate::sandbox::{Sandbox, SandboxStats};
}

pub use prelude::*;
