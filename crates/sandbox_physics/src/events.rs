//! Collision events collected during a step

use glam::Vec2;

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use crate::collision::CollisionType;

/// Contact data from a collision
#[derive(Debug, Clone, Copy)]
pub struct ContactData {
    /// Contact point in world space
    pub point: Vec2,
    /// Contact normal (pointing from collider1 to collider2)
    pub normal: Vec2,
    /// Signed separation; negative while penetrating
    pub depth: f32,
    /// Impulse applied at this contact
    pub impulse: f32,
}

/// Type of collision event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventType {
    /// Collision started
    Started,
    /// Collision ended
    Stopped,
}

/// A collision event between two shapes
#[derive(Debug, Clone)]
pub struct CollisionEvent {
    /// First collider
    pub collider1: ColliderHandle,
    /// Second collider
    pub collider2: ColliderHandle,
    /// Body owning the first collider, if it is still alive
    pub body1: Option<RigidBodyHandle>,
    /// Body owning the second collider, if it is still alive
    pub body2: Option<RigidBodyHandle>,
    /// Collision type of the first collider
    pub type1: CollisionType,
    /// Collision type of the second collider
    pub type2: CollisionType,
    /// Event type
    pub event_type: CollisionEventType,
    /// Whether this is a sensor event
    pub is_sensor: bool,
    /// Contact points (empty for sensor events or stopped events)
    pub contacts: Vec<ContactData>,
    /// User data from collider 1
    pub user_data1: u128,
    /// User data from collider 2
    pub user_data2: u128,
}

impl CollisionEvent {
    /// Check if this is a start event
    pub fn is_started(&self) -> bool {
        self.event_type == CollisionEventType::Started
    }

    /// Check if this is a stop event
    pub fn is_stopped(&self) -> bool {
        self.event_type == CollisionEventType::Stopped
    }

    /// The same event seen from the second collider's side
    pub fn swapped(&self) -> Self {
        Self {
            collider1: self.collider2,
            collider2: self.collider1,
            body1: self.body2,
            body2: self.body1,
            type1: self.type2,
            type2: self.type1,
            event_type: self.event_type,
            is_sensor: self.is_sensor,
            contacts: self
                .contacts
                .iter()
                .map(|c| ContactData {
                    normal: -c.normal,
                    ..*c
                })
                .collect(),
            user_data1: self.user_data2,
            user_data2: self.user_data1,
        }
    }

    /// Get the average contact point
    pub fn average_contact_point(&self) -> Option<Vec2> {
        if self.contacts.is_empty() {
            return None;
        }
        let sum: Vec2 = self.contacts.iter().map(|c| c.point).sum();
        Some(sum / self.contacts.len() as f32)
    }

}

/// Buffer of the events produced by the last step
#[derive(Default)]
pub struct EventCollector {
    /// Collision events this step
    pub collision_events: Vec<CollisionEvent>,
}

impl EventCollector {
    /// Create a new event collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all collected events
    pub fn clear(&mut self) {
        self.collision_events.clear();
    }

    /// Get collision start events
    pub fn started_collisions(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.collision_events.iter().filter(|e| e.is_started())
    }

}
