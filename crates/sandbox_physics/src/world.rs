//! Simulation space - bodies, shapes, joints and the fixed-step integrator

use glam::Vec2;
use rapier2d::prelude as rapier;
use std::collections::HashMap;
use std::num::NonZeroUsize;

use crate::body::{BodyState, RigidBodyDesc, RigidBodyHandle};
use crate::collider::{ColliderDesc, ColliderHandle};
use crate::collision::CollisionType;
use crate::config::PhysicsConfig;
use crate::debug::{self, DebugDraw, OutlineBackend};
use crate::error::{PhysicsError, Result};
use crate::events::{CollisionEvent, CollisionEventType, ContactData, EventCollector};
use crate::joint::{JointHandle, PivotJointDesc};
use crate::math;
use crate::query::PhysicsQuery;

/// The simulation space containing all bodies, shapes and joints
pub struct PhysicsWorld {
    /// Configuration
    config: PhysicsConfig,

    /// Rapier physics pipeline
    pipeline: rapier::PhysicsPipeline,

    /// Gravity
    gravity: rapier::Vector<f32>,

    /// Integration parameters
    integration_params: rapier::IntegrationParameters,

    /// Island manager
    islands: rapier::IslandManager,

    /// Broad phase
    broad_phase: rapier::DefaultBroadPhase,

    /// Narrow phase
    narrow_phase: rapier::NarrowPhase,

    /// Impulse joint set
    impulse_joints: rapier::ImpulseJointSet,

    /// Multibody joint set
    multibody_joints: rapier::MultibodyJointSet,

    /// CCD solver
    ccd_solver: rapier::CCDSolver,

    /// Query pipeline
    query_pipeline: rapier::QueryPipeline,

    /// Shape outline renderer
    debug_pipeline: rapier::DebugRenderPipeline,

    /// Rigid body set
    bodies: rapier::RigidBodySet,

    /// Collider set
    colliders: rapier::ColliderSet,

    /// Events produced by the last step
    events: EventCollector,

    /// Handler tag of every live collider
    collision_types: HashMap<rapier::ColliderHandle, CollisionType>,

    /// Number of steps taken
    step_count: u64,
}

impl PhysicsWorld {
    /// Create a new simulation space
    pub fn new(config: PhysicsConfig) -> Self {
        let gravity = math::vector(Vec2::from(config.gravity));

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.length_unit = config.length_unit;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.velocity_iterations).unwrap_or(NonZeroUsize::MIN);

        log::debug!(
            "Simulation space created: dt={:.5}, gravity=({}, {})",
            config.timestep,
            config.gravity[0],
            config.gravity[1]
        );

        Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            query_pipeline: rapier::QueryPipeline::new(),
            debug_pipeline: debug::outline_pipeline(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            events: EventCollector::new(),
            collision_types: HashMap::new(),
            step_count: 0,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Fixed timestep of one step
    pub fn timestep(&self) -> f32 {
        self.integration_params.dt
    }

    /// Set gravity, waking every dynamic body so the change takes effect
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = math::vector(gravity);
        for (_, body) in self.bodies.iter_mut() {
            if body.is_dynamic() {
                body.wake_up(true);
            }
        }
    }

    /// Get gravity
    pub fn gravity(&self) -> Vec2 {
        math::from_vector(&self.gravity)
    }

    // ==================== Rigid Bodies ====================

    /// Create a rigid body
    pub fn create_rigid_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle {
        let mut builder = desc.to_rapier_builder();
        if !self.config.sleeping_enabled {
            builder = builder.can_sleep(false);
        }
        RigidBodyHandle(self.bodies.insert(builder))
    }

    /// Create a shape, attached to `parent` when given
    pub fn create_collider(
        &mut self,
        desc: ColliderDesc,
        parent: Option<RigidBodyHandle>,
    ) -> Result<ColliderHandle> {
        let builder = desc.to_rapier_builder()?;
        let handle = match parent {
            Some(body) => {
                if !self.bodies.contains(body.0) {
                    return Err(PhysicsError::BodyNotFound(body));
                }
                self.colliders
                    .insert_with_parent(builder, body.0, &mut self.bodies)
            }
            None => self.colliders.insert(builder),
        };
        self.collision_types.insert(handle, desc.collision_type);
        self.query_pipeline.update(&self.colliders);
        Ok(ColliderHandle(handle))
    }

    /// Create a body and its single shape in one go
    pub fn create_body_with_collider(
        &mut self,
        body: RigidBodyDesc,
        collider: ColliderDesc,
    ) -> Result<(RigidBodyHandle, ColliderHandle)> {
        // Validate the shape before inserting anything.
        collider.shape.to_rapier()?;
        let body = self.create_rigid_body(body);
        let collider = self.create_collider(collider, Some(body))?;
        Ok((body, collider))
    }

    /// Remove a body together with its shapes and joints.
    ///
    /// Returns `false` when the body was already gone.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        let Some(body) = self.bodies.get(handle.0) else {
            return false;
        };
        for collider in body.colliders() {
            self.collision_types.remove(collider);
        }

        self.bodies.remove(
            handle.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.query_pipeline.update(&self.colliders);
        true
    }

    /// Whether the body is still in the space
    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    /// Snapshot of a body's state
    pub fn body_state(&self, handle: RigidBodyHandle) -> Result<BodyState> {
        self.bodies
            .get(handle.0)
            .map(BodyState::from_rapier)
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Move a body. Kinematic bodies get it as their next target so the
    /// integrator derives a velocity from the motion.
    pub fn set_body_position(&mut self, handle: RigidBodyHandle, position: Vec2) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| {
                if b.is_kinematic() {
                    b.set_next_kinematic_translation(math::vector(position));
                } else {
                    b.set_translation(math::vector(position), true);
                }
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Place a body at `position` immediately, without deriving a velocity
    /// from the jump. Kinematic bodies also stop there on the next step.
    pub fn teleport_body(&mut self, handle: RigidBodyHandle, position: Vec2) -> Result<()> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        body.set_translation(math::vector(position), true);
        if body.is_kinematic() {
            body.set_next_kinematic_translation(math::vector(position));
        }
        Ok(())
    }

    /// Add a force for the next step at a point in the body's local frame.
    ///
    /// Forces are cleared after every step. Non-dynamic bodies ignore it and
    /// `Ok(false)` is returned.
    pub fn apply_force_at_local_point(
        &mut self,
        handle: RigidBodyHandle,
        force: Vec2,
        local_point: Vec2,
    ) -> Result<bool> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        if !body.is_dynamic() {
            return Ok(false);
        }
        let world_point = body.position() * math::point(local_point);
        body.add_force_at_point(math::vector(force), world_point, true);
        Ok(true)
    }

    /// Apply an impulse through the center of mass.
    ///
    /// Non-dynamic bodies ignore it and `Ok(false)` is returned.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec2) -> Result<bool> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;
        if !body.is_dynamic() {
            return Ok(false);
        }
        body.apply_impulse(math::vector(impulse), true);
        Ok(true)
    }

    /// Convert a world point into the body's local frame
    pub fn world_to_local_point(&self, handle: RigidBodyHandle, point: Vec2) -> Result<Vec2> {
        self.bodies
            .get(handle.0)
            .map(|b| math::from_point(&b.position().inverse_transform_point(&math::point(point))))
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Convert a point in the body's local frame into world space
    pub fn local_to_world_point(&self, handle: RigidBodyHandle, point: Vec2) -> Result<Vec2> {
        self.bodies
            .get(handle.0)
            .map(|b| math::from_point(&(b.position() * math::point(point))))
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    // ==================== Shapes ====================

    /// Handler tag of a shape, if it is still in the space
    pub fn collision_type(&self, handle: ColliderHandle) -> Option<CollisionType> {
        self.collision_types.get(&handle.0).copied()
    }

    // ==================== Joints ====================

    /// Pin `anchor2` of `body2` onto `anchor1` of `body1`
    pub fn create_pivot_joint(
        &mut self,
        body1: RigidBodyHandle,
        body2: RigidBodyHandle,
        desc: PivotJointDesc,
    ) -> Result<JointHandle> {
        for body in [body1, body2] {
            if !self.bodies.contains(body.0) {
                return Err(PhysicsError::BodyNotFound(body));
            }
        }
        let handle = self
            .impulse_joints
            .insert(body1.0, body2.0, desc.to_rapier(self.integration_params.dt), true);
        Ok(JointHandle(handle))
    }

    /// Remove a joint. Returns `false` when it was already gone.
    pub fn remove_joint(&mut self, handle: JointHandle) -> bool {
        self.impulse_joints.remove(handle.0, true).is_some()
    }

    /// Whether the joint is still in the space
    pub fn contains_joint(&self, handle: JointHandle) -> bool {
        self.impulse_joints.get(handle.0).is_some()
    }

    // ==================== Simulation ====================

    /// Advance the space by exactly one fixed timestep
    pub fn step(&mut self) {
        self.events.clear();

        let (collision_send, collision_recv) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector {
            collision_events: collision_send,
        };

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &event_handler,
        );

        // Forces apply to a single step only.
        for (_, body) in self.bodies.iter_mut() {
            body.reset_forces(false);
            body.reset_torques(false);
        }

        while let Ok(event) = collision_recv.try_recv() {
            let (h1, h2, started) = match event {
                rapier::CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                rapier::CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            let c1 = self.colliders.get(h1);
            let c2 = self.colliders.get(h2);

            let is_sensor = c1.map(|c| c.is_sensor()).unwrap_or(false)
                || c2.map(|c| c.is_sensor()).unwrap_or(false);

            let contacts = if started && !is_sensor {
                self.contacts_between(h1, h2)
            } else {
                Vec::new()
            };

            self.events.collision_events.push(CollisionEvent {
                collider1: ColliderHandle(h1),
                collider2: ColliderHandle(h2),
                body1: c1.and_then(|c| c.parent()).map(RigidBodyHandle),
                body2: c2.and_then(|c| c.parent()).map(RigidBodyHandle),
                type1: self.collision_types.get(&h1).copied().unwrap_or_default(),
                type2: self.collision_types.get(&h2).copied().unwrap_or_default(),
                event_type: if started {
                    CollisionEventType::Started
                } else {
                    CollisionEventType::Stopped
                },
                is_sensor,
                contacts,
                user_data1: c1.map(|c| c.user_data).unwrap_or(0),
                user_data2: c2.map(|c| c.user_data).unwrap_or(0),
            });
        }

        self.step_count += 1;
    }

    /// Contact points between two shapes, in world space, normals pointing from `h1` to `h2`
    fn contacts_between(&self, h1: rapier::ColliderHandle, h2: rapier::ColliderHandle) -> Vec<ContactData> {
        let mut contacts = Vec::new();

        let Some(pair) = self.narrow_phase.contact_pair(h1, h2) else {
            return contacts;
        };
        let Some(first) = self.colliders.get(pair.collider1) else {
            return contacts;
        };
        let frame = first.position();
        // The pair may be stored in the opposite order.
        let sign = if pair.collider1 == h1 { 1.0 } else { -1.0 };

        for manifold in &pair.manifolds {
            let normal = math::from_vector(&(frame * manifold.local_n1)) * sign;
            for point in &manifold.points {
                contacts.push(ContactData {
                    point: math::from_point(&(frame * point.local_p1)),
                    normal,
                    depth: point.dist,
                    impulse: point.data.impulse,
                });
            }
        }

        contacts
    }

    // ==================== Queries ====================

    /// Get a query interface for point queries
    pub fn query(&self) -> PhysicsQuery<'_> {
        PhysicsQuery {
            query_pipeline: &self.query_pipeline,
            colliders: &self.colliders,
            bodies: &self.bodies,
        }
    }

    // ==================== Events ====================

    /// Get contacts that started during the last step
    pub fn collision_started(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.events.started_collisions()
    }

    // ==================== Debug ====================

    /// Feed the outline of every shape to `draw`, in world space
    pub fn debug_draw(&mut self, draw: &mut dyn DebugDraw) {
        let mut backend = OutlineBackend { draw };
        self.debug_pipeline.render(
            &mut backend,
            &self.bodies,
            &self.colliders,
            &self.impulse_joints,
            &self.multibody_joints,
            &self.narrow_phase,
        );
    }

    /// Get number of rigid bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get number of colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Get number of joints
    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    /// Get number of steps taken since creation
    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

/// Channel-based event collector for Rapier
struct ChannelEventCollector {
    collision_events: crossbeam_channel::Sender<rapier::CollisionEvent>,
}

impl rapier::EventHandler for ChannelEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        _contact_pair: Option<&rapier::ContactPair>,
    ) {
        let _ = self.collision_events.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}
