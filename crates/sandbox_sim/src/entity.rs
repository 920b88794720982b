//! Entity variants and their collision reactions

use glam::Vec2;
use sandbox_asset::Sprite;
use sandbox_physics::{
    BodyState, ColliderDesc, ColliderHandle, ColliderShape, CollisionType, PhysicsWorld,
    RigidBodyDesc, RigidBodyHandle,
};
use sandbox_view::Rect;
use std::fmt;
use std::str::FromStr;

use crate::config::{BodyTuning, EntityTuning};
use crate::error::SpawnError;

/// The entity variants the sandbox can spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// The user-steerable body; at most one exists
    Controllable,
    Ball,
    Box,
    Bouncer,
    Coin,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Controllable,
        EntityKind::Ball,
        EntityKind::Box,
        EntityKind::Bouncer,
        EntityKind::Coin,
    ];

    /// Display name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Controllable => "Player",
            EntityKind::Ball => "Ball",
            EntityKind::Box => "Box",
            EntityKind::Bouncer => "Bouncer",
            EntityKind::Coin => "Coin",
        }
    }

    /// Handler tag carried by the variant's shape
    pub fn collision_type(&self) -> CollisionType {
        match self {
            EntityKind::Controllable => CollisionType::PLAYER,
            EntityKind::Ball => CollisionType::BALL,
            EntityKind::Box => CollisionType::BOX,
            EntityKind::Bouncer => CollisionType::BOUNCER,
            EntityKind::Coin => CollisionType::COIN,
        }
    }

    /// Construction parameters for this variant
    pub fn tuning<'a>(&self, tuning: &'a EntityTuning) -> &'a BodyTuning {
        match self {
            EntityKind::Controllable => &tuning.player,
            EntityKind::Ball => &tuning.ball,
            EntityKind::Box => &tuning.crate_box,
            EntityKind::Bouncer => &tuning.bouncer,
            EntityKind::Coin => &tuning.coin,
        }
    }

    /// Shape for this variant. Boxes are sized to their sprite.
    pub fn shape(&self, body: &BodyTuning, sprite: &Sprite) -> ColliderShape {
        match self {
            EntityKind::Box => {
                ColliderShape::from_size(sprite.width() as f32, sprite.height() as f32)
            }
            _ => ColliderShape::circle(body.radius),
        }
    }

    /// Body and shape descriptions for a new entity at `position`
    pub fn descriptors(
        &self,
        tuning: &EntityTuning,
        sprite: &Sprite,
        position: Vec2,
        user_data: u128,
    ) -> (RigidBodyDesc, ColliderDesc) {
        let body = self.tuning(tuning);
        let (rigid_body, mass) = if body.is_static {
            (RigidBodyDesc::fixed(), 0.0)
        } else {
            (RigidBodyDesc::dynamic(), body.mass)
        };

        (
            rigid_body.with_position(position).with_user_data(user_data),
            ColliderDesc::new(self.shape(body, sprite))
                .with_mass(mass)
                .with_material(body.material())
                .with_collision_type(self.collision_type())
                .with_user_data(user_data),
        )
    }

    /// Game reaction of this variant to a new contact, if it has one
    pub fn on_collision(&self, contact: &Contact<'_>, tuning: &EntityTuning, dt: f32) -> Option<Reaction> {
        match self {
            EntityKind::Bouncer => {
                if !contact.other.is_dynamic() {
                    return None;
                }
                let direction = (contact.other.position - contact.own.position).normalize_or_zero();
                Some(Reaction::Impulse {
                    body: contact.other_body,
                    impulse: direction * tuning.bounce_impulse * dt,
                })
            }
            EntityKind::Coin if contact.other_type == CollisionType::PLAYER => Some(Reaction::Collect {
                value: tuning.coin_value,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = SpawnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "player" | "controllable" => Ok(EntityKind::Controllable),
            "ball" => Ok(EntityKind::Ball),
            "box" => Ok(EntityKind::Box),
            "bouncer" => Ok(EntityKind::Bouncer),
            "coin" => Ok(EntityKind::Coin),
            _ => Err(SpawnError::UnknownKind(s.to_string())),
        }
    }
}

/// One side of a new contact, seen from the reacting entity
#[derive(Debug, Clone, Copy)]
pub struct Contact<'a> {
    /// State of the reacting entity's body
    pub own: &'a BodyState,
    /// State of the body it touched
    pub other: &'a BodyState,
    pub other_body: RigidBodyHandle,
    pub other_type: CollisionType,
}

/// What an entity wants done in response to a contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reaction {
    /// Push `body` through its center of mass
    Impulse { body: RigidBodyHandle, impulse: Vec2 },
    /// Add `value` to the score and retire the reacting entity
    Collect { value: u64 },
}

/// A live entity: one body, one shape, and its presentation
#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
    pub sprite: Sprite,
    /// World-space sprite bounds, centered on the body
    pub bounds: Rect,
    pub angle: f32,
    pub is_static: bool,
    /// Set by collision reactions; swept at the next tick boundary
    pub marked_for_removal: bool,
}

impl Entity {
    pub fn new(
        kind: EntityKind,
        body: RigidBodyHandle,
        collider: ColliderHandle,
        sprite: Sprite,
        position: Vec2,
        is_static: bool,
    ) -> Self {
        let size = Vec2::new(sprite.width() as f32, sprite.height() as f32);
        Self {
            kind,
            body,
            collider,
            sprite,
            bounds: Rect::from_center_size(position, size),
            angle: 0.0,
            is_static,
            marked_for_removal: false,
        }
    }

    /// World position of the presentation
    pub fn position(&self) -> Vec2 {
        self.bounds.center
    }

    /// Copy the body pose into the presentation. Static entities never move.
    pub fn sync(&mut self, space: &PhysicsWorld) -> sandbox_physics::Result<()> {
        if self.is_static {
            return Ok(());
        }
        let state = space.body_state(self.body)?;
        self.bounds.center = state.position;
        self.angle = state.angle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sandbox_physics::RigidBodyType;

    fn state(body_type: RigidBodyType, position: Vec2) -> BodyState {
        BodyState {
            body_type,
            position,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            mass: 1.0,
            moment: 1.0,
            user_data: 0,
        }
    }

    fn other_handle() -> RigidBodyHandle {
        let mut space = PhysicsWorld::default();
        space.create_rigid_body(RigidBodyDesc::dynamic())
    }

    #[test]
    fn tags_parse_case_insensitively() {
        assert_eq!("Player".parse::<EntityKind>().unwrap(), EntityKind::Controllable);
        assert_eq!("controllable".parse::<EntityKind>().unwrap(), EntityKind::Controllable);
        assert_eq!(" BOX ".parse::<EntityKind>().unwrap(), EntityKind::Box);
        assert!(matches!(
            "rocket".parse::<EntityKind>(),
            Err(SpawnError::UnknownKind(tag)) if tag == "rocket"
        ));
    }

    #[test]
    fn bouncer_pushes_dynamic_bodies_away() {
        let tuning = EntityTuning::default();
        let own = state(RigidBodyType::Static, Vec2::new(0.0, 0.0));
        let other = state(RigidBodyType::Dynamic, Vec2::new(3.0, 4.0));
        let other_body = other_handle();
        let contact = Contact {
            own: &own,
            other: &other,
            other_body,
            other_type: CollisionType::BALL,
        };

        let dt = 1.0 / 60.0;
        match EntityKind::Bouncer.on_collision(&contact, &tuning, dt) {
            Some(Reaction::Impulse { body, impulse }) => {
                assert_eq!(body, other_body);
                assert_relative_eq!(impulse.length(), tuning.bounce_impulse * dt, epsilon = 1e-2);
                assert_relative_eq!(impulse.normalize().x, 0.6, epsilon = 1e-5);
                assert_relative_eq!(impulse.normalize().y, 0.8, epsilon = 1e-5);
            }
            other => panic!("expected an impulse, got {:?}", other),
        }
    }

    #[test]
    fn bouncer_ignores_static_partners() {
        let tuning = EntityTuning::default();
        let own = state(RigidBodyType::Static, Vec2::ZERO);
        let other = state(RigidBodyType::Static, Vec2::X);
        let contact = Contact {
            own: &own,
            other: &other,
            other_body: other_handle(),
            other_type: CollisionType::NONE,
        };
        assert!(EntityKind::Bouncer.on_collision(&contact, &tuning, 1.0 / 60.0).is_none());
    }

    #[test]
    fn coin_reacts_only_to_player() {
        let tuning = EntityTuning::default();
        let own = state(RigidBodyType::Dynamic, Vec2::ZERO);
        let other = state(RigidBodyType::Dynamic, Vec2::X);
        let mut contact = Contact {
            own: &own,
            other: &other,
            other_body: other_handle(),
            other_type: CollisionType::BALL,
        };
        assert!(EntityKind::Coin.on_collision(&contact, &tuning, 0.1).is_none());

        contact.other_type = CollisionType::PLAYER;
        assert_eq!(
            EntityKind::Coin.on_collision(&contact, &tuning, 0.1),
            Some(Reaction::Collect { value: 10 })
        );
        assert!(EntityKind::Ball.on_collision(&contact, &tuning, 0.1).is_none());
    }

    #[test]
    fn static_variant_gets_fixed_body_and_no_mass() {
        let tuning = EntityTuning::default();
        let sprite = Sprite::placeholder();
        let (body, shape) = EntityKind::Bouncer.descriptors(&tuning, &sprite, Vec2::new(5.0, 6.0), 7);
        assert_eq!(body.body_type, RigidBodyType::Static);
        assert_eq!(body.position, [5.0, 6.0]);
        assert_eq!(shape.mass, 0.0);
        assert_eq!(shape.collision_type, CollisionType::BOUNCER);
        assert_eq!(shape.user_data, 7);
    }

    #[test]
    fn box_is_sized_to_its_sprite() {
        let tuning = EntityTuning::default();
        let sprite = Sprite::placeholder();
        let (_, shape) = EntityKind::Box.descriptors(&tuning, &sprite, Vec2::ZERO, 1);
        assert_eq!(shape.shape, ColliderShape::from_size(50.0, 50.0));
        assert_eq!(shape.mass, 20.0);
    }
}
