//! Spatial queries against the simulation space

use glam::Vec2;
use rapier2d::prelude as rapier;

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use crate::math;

/// Result of a nearest-shape point query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointQueryHit {
    /// The shape that was hit
    pub collider: ColliderHandle,
    /// Body owning the shape, if any
    pub body: Option<RigidBodyHandle>,
    /// Closest point on the shape surface, in world space
    pub point: Vec2,
    /// Distance from the query point to the surface; zero when inside
    pub distance: f32,
    /// User data from the collider
    pub user_data: u128,
}

/// Query interface for the simulation space
pub struct PhysicsQuery<'a> {
    pub(crate) query_pipeline: &'a rapier::QueryPipeline,
    pub(crate) colliders: &'a rapier::ColliderSet,
    pub(crate) bodies: &'a rapier::RigidBodySet,
}

impl<'a> PhysicsQuery<'a> {
    /// Find the shape nearest to `point` within `max_distance`.
    ///
    /// With `max_distance` of zero only shapes containing the point match.
    /// Sensors are skipped.
    pub fn point_query_nearest(
        &self,
        point: Vec2,
        max_distance: f32,
        dynamic_only: bool,
    ) -> Option<PointQueryHit> {
        let query_point = math::point(point);
        let filter = if dynamic_only {
            rapier::QueryFilter::only_dynamic()
        } else {
            rapier::QueryFilter::new()
        }
        .exclude_sensors();

        let (handle, projection) =
            self.query_pipeline
                .project_point(self.bodies, self.colliders, &query_point, true, filter)?;

        let distance = if projection.is_inside {
            0.0
        } else {
            (projection.point - query_point).norm()
        };
        if distance > max_distance {
            return None;
        }

        let collider = self.colliders.get(handle)?;
        Some(PointQueryHit {
            collider: ColliderHandle(handle),
            body: collider.parent().map(RigidBodyHandle),
            point: math::from_point(&projection.point),
            distance,
            user_data: collider.user_data,
        })
    }

    /// Every shape containing `point`
    pub fn shapes_at_point(&self, point: Vec2) -> Vec<ColliderHandle> {
        let mut results = Vec::new();
        self.query_pipeline.intersections_with_point(
            self.bodies,
            self.colliders,
            &math::point(point),
            rapier::QueryFilter::new(),
            |handle| {
                results.push(ColliderHandle(handle));
                true
            },
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use glam::Vec2;

    fn world_with(desc: RigidBodyDesc, radius: f32) -> (PhysicsWorld, RigidBodyHandle) {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let (body, _) = world
            .create_body_with_collider(
                desc.with_position(Vec2::new(100.0, 100.0)),
                ColliderDesc::new(ColliderShape::circle(radius)).with_mass(1.0),
            )
            .expect("circle builds");
        (world, body)
    }

    #[test]
    fn point_inside_shape_is_found_without_stepping() {
        let (world, body) = world_with(RigidBodyDesc::dynamic(), 20.0);
        let hit = world
            .query()
            .point_query_nearest(Vec2::new(105.0, 100.0), 0.0, false)
            .expect("point is inside the circle");
        assert_eq!(hit.body, Some(body));
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn empty_space_returns_nothing() {
        let (world, _) = world_with(RigidBodyDesc::dynamic(), 20.0);
        assert!(world.query().point_query_nearest(Vec2::new(400.0, 400.0), 0.0, false).is_none());
        assert!(world.query().shapes_at_point(Vec2::new(400.0, 400.0)).is_empty());
    }

    #[test]
    fn max_distance_widens_the_search() {
        let (world, _) = world_with(RigidBodyDesc::dynamic(), 20.0);
        let near = Vec2::new(130.0, 100.0);
        assert!(world.query().point_query_nearest(near, 0.0, false).is_none());
        let hit = world
            .query()
            .point_query_nearest(near, 15.0, false)
            .expect("surface is 10 units away");
        approx::assert_relative_eq!(hit.distance, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn dynamic_filter_skips_static_shapes() {
        let (world, _) = world_with(RigidBodyDesc::fixed(), 20.0);
        let at = Vec2::new(100.0, 100.0);
        assert!(world.query().point_query_nearest(at, 0.0, false).is_some());
        assert!(world.query().point_query_nearest(at, 0.0, true).is_none());
    }
}
