//! Error types for the sandbox

use sandbox_physics::PhysicsError;
use std::path::PathBuf;
use thiserror::Error;

/// A spawn request that produced no entity
#[derive(Debug, Error)]
pub enum SpawnError {
    /// Tag does not name an entity kind
    #[error("Unknown entity kind: {0:?}")]
    UnknownKind(String),

    /// The simulation space rejected the body or shape
    #[error("Failed to build entity: {0}")]
    Physics(#[from] PhysicsError),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Cannot parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Simulation space settings are unusable
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}
