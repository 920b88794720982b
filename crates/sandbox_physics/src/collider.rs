//! Collider (shape) types and descriptors

use glam::Vec2;
use rapier2d::prelude as rapier;
use serde::{Deserialize, Serialize};

use crate::body::{moment_for_box, moment_for_circle};
use crate::collision::CollisionType;
use crate::error::{PhysicsError, Result};
use crate::material::PhysicsMaterial;
use crate::math;

/// Handle to a collider in the simulation space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

impl ColliderHandle {
    /// Create from raw Rapier handle
    pub fn from_raw(handle: rapier::ColliderHandle) -> Self {
        Self(handle)
    }

    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::ColliderHandle {
        self.0
    }
}

/// Collision shape type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Circle with radius
    Circle {
        radius: f32,
    },
    /// Axis-aligned box with half-extents
    Box {
        half_extents: [f32; 2],
    },
    /// Convex polygon from counter-clockwise points
    Polygon {
        points: Vec<[f32; 2]>,
    },
    /// Line segment thickened by a radius
    Segment {
        a: [f32; 2],
        b: [f32; 2],
        radius: f32,
    },
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::Circle { radius: 0.5 }
    }
}

impl ColliderShape {
    /// Create a circle shape
    pub fn circle(radius: f32) -> Self {
        Self::Circle { radius }
    }

    /// Create a box shape from full size
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::Box {
            half_extents: [width * 0.5, height * 0.5],
        }
    }

    /// Create a thick segment
    pub fn segment(a: Vec2, b: Vec2, radius: f32) -> Self {
        Self::Segment {
            a: a.to_array(),
            b: b.to_array(),
            radius,
        }
    }

    /// Moment of inertia of this shape for the given mass, about its center
    pub fn moment(&self, mass: f32) -> f32 {
        match self {
            Self::Circle { radius } => moment_for_circle(mass, *radius),
            Self::Box { half_extents } => {
                moment_for_box(mass, half_extents[0] * 2.0, half_extents[1] * 2.0)
            }
            Self::Polygon { points } => {
                // Bounding-box plate approximation for arbitrary hulls.
                let (min, max) = points.iter().fold(
                    (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
                    |(min, max), p| (min.min(Vec2::from(*p)), max.max(Vec2::from(*p))),
                );
                let size = (max - min).max(Vec2::ZERO);
                moment_for_box(mass, size.x, size.y)
            }
            Self::Segment { a, b, radius } => {
                let length = Vec2::from(*a).distance(Vec2::from(*b));
                moment_for_box(mass, length + radius * 2.0, radius * 2.0)
            }
        }
    }

    /// Build a Rapier shared shape
    pub(crate) fn to_rapier(&self) -> Result<rapier::SharedShape> {
        match self {
            Self::Circle { radius } => Ok(rapier::SharedShape::ball(*radius)),
            Self::Box { half_extents } => {
                Ok(rapier::SharedShape::cuboid(half_extents[0], half_extents[1]))
            }
            Self::Polygon { points } => {
                let rapier_points: Vec<_> =
                    points.iter().map(|p| math::point(Vec2::from(*p))).collect();
                rapier::SharedShape::convex_polyline(rapier_points).ok_or_else(|| {
                    PhysicsError::ShapeCreationFailed(format!(
                        "{} points do not form a convex polygon",
                        points.len()
                    ))
                })
            }
            Self::Segment { a, b, radius } => Ok(rapier::SharedShape::capsule(
                math::point(Vec2::from(*a)),
                math::point(Vec2::from(*b)),
                *radius,
            )),
        }
    }
}

/// Description for creating a collider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColliderDesc {
    /// Collision shape
    pub shape: ColliderShape,
    /// Mass given to the parent body. Zero leaves the body massless (static shapes).
    pub mass: f32,
    /// Is this a sensor (no physical response)
    pub is_sensor: bool,
    /// Surface material
    pub material: PhysicsMaterial,
    /// Tag used to select collision handlers
    pub collision_type: CollisionType,
    /// User data (owning entity, etc.)
    pub user_data: u128,
}

impl Default for ColliderDesc {
    fn default() -> Self {
        Self {
            shape: ColliderShape::default(),
            mass: 0.0,
            is_sensor: false,
            material: PhysicsMaterial::default(),
            collision_type: CollisionType::NONE,
            user_data: 0,
        }
    }
}

impl ColliderDesc {
    /// Create a new collider description with a shape
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            ..Default::default()
        }
    }

    /// Set mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(0.0);
        self
    }

    /// Set material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set collision type
    pub fn with_collision_type(mut self, collision_type: CollisionType) -> Self {
        self.collision_type = collision_type;
        self
    }

    /// Set user data
    pub fn with_user_data(mut self, data: u128) -> Self {
        self.user_data = data;
        self
    }

    /// Build a Rapier collider builder
    pub(crate) fn to_rapier_builder(&self) -> Result<rapier::ColliderBuilder> {
        let mass_properties = if self.mass > 0.0 {
            rapier::MassProperties::new(
                rapier::Point::origin(),
                self.mass,
                self.shape.moment(self.mass),
            )
        } else {
            rapier::MassProperties::default()
        };

        Ok(rapier::ColliderBuilder::new(self.shape.to_rapier()?)
            .sensor(self.is_sensor)
            .friction(self.material.friction)
            .friction_combine_rule(self.material.friction_combine.into())
            .restitution(self.material.restitution)
            .restitution_combine_rule(self.material.restitution_combine.into())
            .mass_properties(mass_properties)
            .active_events(rapier::ActiveEvents::COLLISION_EVENTS)
            .user_data(self.user_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn moment_follows_geometry() {
        assert_relative_eq!(ColliderShape::circle(10.0).moment(2.0), 100.0);
        assert_relative_eq!(
            ColliderShape::from_size(30.0, 40.0).moment(12.0),
            moment_for_box(12.0, 30.0, 40.0)
        );
    }

    #[test]
    fn degenerate_polygon_is_an_error() {
        let shape = ColliderShape::Polygon {
            points: vec![[0.0, 0.0], [1.0, 1.0]],
        };
        assert!(matches!(
            shape.to_rapier(),
            Err(PhysicsError::ShapeCreationFailed(_))
        ));
    }

    #[test]
    fn builder_keeps_material() {
        let desc = ColliderDesc::new(ColliderShape::circle(1.0))
            .with_mass(3.0)
            .with_material(PhysicsMaterial::new(0.25, 2.0));
        let collider = desc.to_rapier_builder().expect("circle builds").build();
        assert_relative_eq!(collider.friction(), 0.25);
        assert_relative_eq!(collider.restitution(), 2.0);
        assert_relative_eq!(collider.mass(), 3.0);
    }

    #[test]
    fn massless_shape_adds_no_mass() {
        let collider = ColliderDesc::new(ColliderShape::from_size(40.0, 10.0))
            .to_rapier_builder()
            .expect("box builds")
            .build();
        assert_eq!(collider.mass(), 0.0);
    }
}
