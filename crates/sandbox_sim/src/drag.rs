//! Pointer dragging through a pivot joint
//!
//! A kinematic pointer body follows the pointer in world space. Pressing on a
//! dynamic shape pins the point under the pointer to that body with a
//! force-limited pivot; the solver then pulls the shape along every step.

use glam::Vec2;
use sandbox_physics::{JointHandle, PhysicsWorld, PivotJointDesc, RigidBodyDesc, RigidBodyHandle};

use crate::config::DragConfig;

/// Owns the pointer body and the single active drag joint
pub struct DragController {
    pointer_body: RigidBodyHandle,
    joint: Option<JointHandle>,
    selected: Option<RigidBodyHandle>,
    config: DragConfig,
}

impl DragController {
    /// Create the controller and its pointer body in `space`
    pub fn new(space: &mut PhysicsWorld, config: DragConfig) -> Self {
        let pointer_body = space.create_rigid_body(RigidBodyDesc::kinematic());
        Self {
            pointer_body,
            joint: None,
            selected: None,
            config,
        }
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Body that follows the pointer
    pub fn pointer_body(&self) -> RigidBodyHandle {
        self.pointer_body
    }

    /// Start dragging the dynamic shape under `world`, if any.
    ///
    /// Any drag in progress is released first. Returns whether a joint was created.
    pub fn press(&mut self, space: &mut PhysicsWorld, world: Vec2, zoom: f32) -> bool {
        self.release(space);

        let Some(hit) = space.query().point_query_nearest(world, 0.0, true) else {
            return false;
        };
        let Some(body) = hit.body else {
            return false;
        };

        match self.attach(space, body, world, zoom) {
            Ok(joint) => {
                log::debug!("Drag started at ({:.1}, {:.1})", world.x, world.y);
                self.joint = Some(joint);
                self.selected = Some(body);
                true
            }
            Err(err) => {
                log::warn!("Cannot start drag: {}", err);
                false
            }
        }
    }

    fn attach(
        &self,
        space: &mut PhysicsWorld,
        body: RigidBodyHandle,
        world: Vec2,
        zoom: f32,
    ) -> sandbox_physics::Result<JointHandle> {
        space.teleport_body(self.pointer_body, world)?;
        let anchor = space.world_to_local_point(body, world)?;
        let desc = PivotJointDesc::new(Vec2::ZERO, anchor)
            .with_max_force(self.config.max_force * zoom)
            .with_error_bias(self.config.error_bias);
        space.create_pivot_joint(self.pointer_body, body, desc)
    }

    /// Move the pointer body to the new pointer position
    pub fn motion(&mut self, space: &mut PhysicsWorld, world: Vec2) {
        if self.joint.is_none() {
            return;
        }
        if let Err(err) = space.set_body_position(self.pointer_body, world) {
            log::warn!("Pointer body lost: {}", err);
        }
    }

    /// Drop the drag joint. Does nothing when not dragging.
    pub fn release(&mut self, space: &mut PhysicsWorld) {
        if let Some(joint) = self.joint.take() {
            space.remove_joint(joint);
            log::debug!("Drag released");
        }
        self.selected = None;
    }

    /// Forget the drag when the dragged body is about to be removed
    pub fn on_body_removed(&mut self, space: &mut PhysicsWorld, body: RigidBodyHandle) {
        if self.selected == Some(body) {
            self.release(space);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.joint.is_some()
    }

    /// Body currently being dragged
    pub fn selected_body(&self) -> Option<RigidBodyHandle> {
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox_physics::{ColliderDesc, ColliderShape, PhysicsConfig};

    fn space() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsConfig::default().with_gravity(0.0, 0.0))
    }

    #[test]
    fn press_on_empty_space_does_nothing() {
        let mut space = space();
        let mut drag = DragController::new(&mut space, DragConfig::default());
        assert!(!drag.press(&mut space, Vec2::new(10.0, 10.0), 1.0));
        assert!(!drag.is_dragging());
        assert_eq!(space.joint_count(), 0);
    }

    #[test]
    fn press_release_is_idempotent() {
        let mut space = space();
        let mut drag = DragController::new(&mut space, DragConfig::default());
        let (body, _) = space
            .create_body_with_collider(
                RigidBodyDesc::dynamic().with_position(Vec2::new(100.0, 100.0)),
                ColliderDesc::new(ColliderShape::circle(12.0)).with_mass(10.0),
            )
            .unwrap();

        assert!(drag.press(&mut space, Vec2::new(104.0, 100.0), 1.0));
        assert_eq!(drag.selected_body(), Some(body));
        // A second press replaces the joint instead of adding one.
        assert!(drag.press(&mut space, Vec2::new(100.0, 104.0), 1.0));
        assert_eq!(space.joint_count(), 1);

        drag.release(&mut space);
        drag.release(&mut space);
        assert!(!drag.is_dragging());
        assert_eq!(space.joint_count(), 0);
    }

    #[test]
    fn removed_selection_releases_joint() {
        let mut space = space();
        let mut drag = DragController::new(&mut space, DragConfig::default());
        let (body, _) = space
            .create_body_with_collider(
                RigidBodyDesc::dynamic().with_position(Vec2::new(50.0, 50.0)),
                ColliderDesc::new(ColliderShape::circle(10.0)).with_mass(1.0),
            )
            .unwrap();
        assert!(drag.press(&mut space, Vec2::new(50.0, 50.0), 2.0));

        drag.on_body_removed(&mut space, body);
        assert!(!drag.is_dragging());
        assert!(drag.selected_body().is_none());
    }
}
