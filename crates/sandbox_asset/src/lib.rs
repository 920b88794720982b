//! Sandbox Asset - sprite loading
//!
//! Sprites are decoded through the `image` crate, scaled once, and kept in an
//! [`ImageCache`] owned by the sandbox. Loading never fails outright: art that
//! is missing or undecodable is replaced by a placeholder.

pub mod cache;
pub mod error;

pub use cache::{AssetProvider, ImageCache, Sprite, PLACEHOLDER_SIZE};
pub use error::AssetError;
