//! Collision types and begin-contact handler dispatch
//!
//! Every shape carries a [`CollisionType`] tag. Game logic registers handlers
//! either for an exact pair of tags or for a single tag matched against any
//! partner. After each step the space's new contacts are routed to at most
//! one pair handler, or else to the wildcard handlers of both sides.
//!
//! Handlers see the event oriented so that `type1` is the first tag they were
//! registered with. Contact resolution has already been applied by the
//! integrator; handlers layer game reactions on top of it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::events::CollisionEvent;
use crate::world::PhysicsWorld;

/// Small integer tag selecting which handlers fire for a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionType(pub u32);

impl CollisionType {
    /// No game logic (world boundaries)
    pub const NONE: Self = Self(0);
    /// The user-controlled body
    pub const PLAYER: Self = Self(1);
    /// Collectible coin
    pub const COIN: Self = Self(2);
    /// Static bouncer
    pub const BOUNCER: Self = Self(3);
    /// Box
    pub const BOX: Self = Self(4);
    /// Generic ball
    pub const BALL: Self = Self(5);
}

impl Default for CollisionType {
    fn default() -> Self {
        Self::NONE
    }
}

/// Reaction to a new contact between two shapes.
///
/// `C` is the caller's context (entity table, score, ...), threaded through
/// dispatch so handlers can mutate game state without owning it.
pub trait CollisionHandler<C> {
    /// Called once when two shapes start touching
    fn begin(&mut self, event: &CollisionEvent, space: &mut PhysicsWorld, context: &mut C);
}

impl<C, F> CollisionHandler<C> for F
where
    F: FnMut(&CollisionEvent, &mut PhysicsWorld, &mut C),
{
    fn begin(&mut self, event: &CollisionEvent, space: &mut PhysicsWorld, context: &mut C) {
        self(event, space, context)
    }
}

/// Registry of begin handlers keyed by collision type
pub struct CollisionHandlers<C> {
    pairs: HashMap<(CollisionType, CollisionType), Box<dyn CollisionHandler<C>>>,
    wildcards: HashMap<CollisionType, Box<dyn CollisionHandler<C>>>,
}

impl<C> Default for CollisionHandlers<C> {
    fn default() -> Self {
        Self {
            pairs: HashMap::new(),
            wildcards: HashMap::new(),
        }
    }
}

impl<C> CollisionHandlers<C> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for contacts between `a` and `b`, in either order.
    /// Replaces any handler previously registered for the same pair.
    pub fn add_pair_handler<H>(&mut self, a: CollisionType, b: CollisionType, handler: H)
    where
        H: CollisionHandler<C> + 'static,
    {
        self.pairs.remove(&(b, a));
        self.pairs.insert((a, b), Box::new(handler));
    }

    /// Register a handler for any contact involving `collision_type`
    pub fn add_wildcard_handler<H>(&mut self, collision_type: CollisionType, handler: H)
    where
        H: CollisionHandler<C> + 'static,
    {
        self.wildcards.insert(collision_type, Box::new(handler));
    }

    /// Whether a pair handler covers these two types
    pub fn has_pair_handler(&self, a: CollisionType, b: CollisionType) -> bool {
        self.pairs.contains_key(&(a, b)) || self.pairs.contains_key(&(b, a))
    }

    /// Route every contact that started during the last step.
    ///
    /// Returns the number of handler invocations.
    pub fn dispatch(&mut self, space: &mut PhysicsWorld, context: &mut C) -> usize {
        let started: Vec<CollisionEvent> = space.collision_started().cloned().collect();
        let mut invoked = 0;

        for event in &started {
            if let Some(handler) = self.pairs.get_mut(&(event.type1, event.type2)) {
                handler.begin(event, space, context);
                invoked += 1;
                continue;
            }
            if let Some(handler) = self.pairs.get_mut(&(event.type2, event.type1)) {
                handler.begin(&event.swapped(), space, context);
                invoked += 1;
                continue;
            }

            if let Some(handler) = self.wildcards.get_mut(&event.type1) {
                handler.begin(event, space, context);
                invoked += 1;
            }
            if event.type2 != event.type1 {
                if let Some(handler) = self.wildcards.get_mut(&event.type2) {
                    handler.begin(&event.swapped(), space, context);
                    invoked += 1;
                }
            }
        }

        if invoked > 0 {
            log::debug!("Dispatched {} collision handler call(s)", invoked);
        }
        invoked
    }
}
