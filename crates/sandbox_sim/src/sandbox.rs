//! The sandbox: entities, input, camera and the fixed-step tick
//!
//! One [`Sandbox::tick`] runs the whole frame in order:
//!
//! 1. drain queued input (drag, zoom, spawn on right click, held keys)
//! 2. pan the camera and push the controllable with the held steering keys
//! 3. advance the simulation space by exactly one fixed step
//! 4. route new contacts to the entity reactions (coins, bouncers)
//! 5. sweep entities marked for removal, then sync the survivors' sprites
//! 6. render and present the frame
//!
//! Collision reactions only flag entities; nothing leaves the space until
//! the sweep, after the step has finished with the current shape set.

use crossbeam_channel::Sender;
use glam::Vec2;
use sandbox_asset::{AssetProvider, ImageCache};
use sandbox_physics::{
    ColliderDesc, ColliderShape, CollisionEvent, CollisionHandlers, CollisionType, DebugDraw,
    PhysicsWorld, RigidBodyDesc, RigidBodyHandle,
};
use sandbox_view::{Camera, Canvas, Frame, FrameSink, GridStyle, TextOverlay};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{BoundaryConfig, EntityTuning, SandboxConfig};
use crate::drag::DragController;
use crate::entity::{Contact, Entity, EntityKind, Reaction};
use crate::error::{ConfigError, SpawnError};
use crate::event_log::{CsvEventLog, EventLog, MemoryEventLog};
use crate::input::{InputEvent, InputQueue, InputState, PointerButton};
use crate::registry::{EntityHandle, EntityRegistry};

const BACKGROUND: [u8; 3] = [30, 30, 40];
const OUTLINE: [u8; 4] = [120, 230, 120, 255];
const HELP_TEXT: &str = "WASD: Move player | Arrow keys: Pan camera | Mouse wheel: Zoom";

/// State collision reactions may touch
struct GameState {
    entities: EntityRegistry<Entity>,
    score: u64,
    tuning: EntityTuning,
    dt: f32,
    log: Box<dyn EventLog>,
}

/// Read-only snapshot for a HUD or a test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SandboxStats {
    /// Live entities (walls and the pointer body are not entities)
    pub entities: usize,
    pub score: u64,
    pub zoom: f32,
    pub pan: Vec2,
    pub gravity: Vec2,
    /// Ticks run so far
    pub tick: u64,
    pub dragging: bool,
}

/// Interactive 2D rigid-body sandbox
pub struct Sandbox {
    config: SandboxConfig,
    space: PhysicsWorld,
    handlers: CollisionHandlers<GameState>,
    state: GameState,
    camera: Camera,
    drag: DragController,
    input: InputState,
    queue: InputQueue,
    assets: Box<dyn AssetProvider>,
    canvas: Canvas,
    grid: GridStyle,
    debug_draw: bool,
    boundaries: Vec<RigidBodyHandle>,
    controllable: Option<EntityHandle>,
    running: Arc<AtomicBool>,
    tick: u64,
    last_tick: Option<Instant>,
    fps: f32,
}

impl Sandbox {
    /// Build a sandbox from validated configuration
    pub fn new(config: SandboxConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let log: Box<dyn EventLog> = match &config.event_log {
            Some(path) => Box::new(CsvEventLog::open(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?),
            None => Box::new(MemoryEventLog::new()),
        };

        let mut space = PhysicsWorld::new(config.physics.clone());
        let drag = DragController::new(&mut space, config.drag.clone());
        let boundaries = if config.boundaries.enabled {
            create_boundaries(&mut space, &config.boundaries, &config)?
        } else {
            Vec::new()
        };

        let mut handlers = CollisionHandlers::new();
        handlers.add_pair_handler(CollisionType::COIN, CollisionType::PLAYER, react);
        handlers.add_wildcard_handler(CollisionType::BOUNCER, react);

        let camera = Camera::new(config.camera.clone());
        let canvas = Canvas::new(
            (config.camera.view_width as u32).max(1),
            (config.camera.view_height as u32).max(1),
        );

        log::info!(
            "Sandbox ready: view {}x{}, gravity ({}, {}), assets {:?}",
            config.camera.view_width,
            config.camera.view_height,
            config.physics.gravity[0],
            config.physics.gravity[1],
            config.asset_root
        );

        Ok(Self {
            state: GameState {
                entities: EntityRegistry::new(),
                score: 0,
                tuning: config.entities.clone(),
                dt: space.timestep(),
                log,
            },
            assets: Box::new(ImageCache::new(config.asset_root.clone())),
            config,
            space,
            handlers,
            camera,
            drag,
            input: InputState::new(),
            queue: InputQueue::new(),
            canvas,
            grid: GridStyle::default(),
            debug_draw: false,
            boundaries,
            controllable: None,
            running: Arc::new(AtomicBool::new(true)),
            tick: 0,
            last_tick: None,
            fps: 0.0,
        })
    }

    /// Replace the sprite source
    pub fn with_assets(mut self, assets: impl AssetProvider + 'static) -> Self {
        self.assets = Box::new(assets);
        self
    }

    /// Replace the event log
    pub fn with_event_log(mut self, log: Box<dyn EventLog>) -> Self {
        self.state.log = log;
        self
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    // ==================== Entities ====================

    /// Spawn an entity at a world position.
    ///
    /// Spawning a controllable retires the previous one.
    pub fn spawn(&mut self, kind: EntityKind, position: Vec2) -> Result<EntityHandle, SpawnError> {
        if kind == EntityKind::Controllable {
            if let Some(previous) = self.controllable.take() {
                self.remove(previous);
            }
        }

        let body_tuning = kind.tuning(&self.state.tuning);
        let sprite = self.assets.load_image(&body_tuning.image, body_tuning.scale);
        let is_static = body_tuning.is_static;

        let tuning = &self.state.tuning;
        let space = &mut self.space;
        let handle = self.state.entities.try_insert_with(|handle| {
            let (body_desc, collider_desc) =
                kind.descriptors(tuning, &sprite, position, handle.to_user_data());
            let (body, collider) = space.create_body_with_collider(body_desc, collider_desc)?;
            Ok::<_, SpawnError>(Entity::new(kind, body, collider, sprite, position, is_static))
        })?;

        if kind == EntityKind::Controllable {
            self.controllable = Some(handle);
        }
        self.state.log.record(&format!(
            "Added {} at ({:.1}, {:.1})",
            kind, position.x, position.y
        ));
        Ok(handle)
    }

    /// Spawn by tag (`"ball"`, `"player"`, ...)
    pub fn spawn_named(&mut self, tag: &str, position: Vec2) -> Result<EntityHandle, SpawnError> {
        let kind: EntityKind = tag.parse()?;
        self.spawn(kind, position)
    }

    /// Spawn at the world point under the view center
    pub fn spawn_at_view_center(&mut self, kind: EntityKind) -> Result<EntityHandle, SpawnError> {
        let position = self.camera.screen_to_world(self.camera.view_center());
        self.spawn(kind, position)
    }

    /// Spawn at the world point under a view position
    pub fn spawn_at_screen(&mut self, kind: EntityKind, screen: Vec2) -> Result<EntityHandle, SpawnError> {
        let position = self.camera.screen_to_world(screen);
        self.spawn(kind, position)
    }

    /// Remove an entity with its body and shape now.
    ///
    /// Returns `false` when it was already gone.
    pub fn remove(&mut self, handle: EntityHandle) -> bool {
        let Some(entity) = self.state.entities.remove(handle) else {
            return false;
        };
        self.drag.on_body_removed(&mut self.space, entity.body);
        self.space.remove_body(entity.body);
        if self.controllable == Some(handle) {
            self.controllable = None;
        }
        log::debug!("Removed {} {}", entity.kind, handle);
        true
    }

    /// Flag an entity for the next sweep. Returns `false` if it is gone.
    pub fn mark_for_removal(&mut self, handle: EntityHandle) -> bool {
        match self.state.entities.get_mut(handle) {
            Some(entity) => {
                entity.marked_for_removal = true;
                true
            }
            None => false,
        }
    }

    /// Remove every entity and restore score and camera. Walls stay.
    pub fn reset(&mut self) {
        self.state.log.record("Resetting simulation...");
        self.drag.release(&mut self.space);
        for (_, entity) in self.state.entities.drain() {
            self.space.remove_body(entity.body);
        }
        self.controllable = None;
        self.state.score = 0;
        self.camera.reset();
        self.state.log.record("Simulation reset.");
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.space.set_gravity(Vec2::new(x, y));
        log::debug!("Gravity set to ({}, {})", x, y);
    }

    pub fn gravity(&self) -> Vec2 {
        self.space.gravity()
    }

    pub fn entity(&self, handle: EntityHandle) -> Option<&Entity> {
        self.state.entities.get(handle)
    }

    /// Live entities with their handles
    pub fn entities(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.state.entities.iter()
    }

    pub fn entity_count(&self) -> usize {
        self.state.entities.len()
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    /// The current controllable, if alive
    pub fn controllable(&self) -> Option<EntityHandle> {
        self.controllable
    }

    /// Wall bodies created at startup
    pub fn boundaries(&self) -> &[RigidBodyHandle] {
        &self.boundaries
    }

    // ==================== Input ====================

    /// Queue handle for producers outside the tick
    pub fn input_sender(&self) -> Sender<InputEvent> {
        self.queue.sender()
    }

    /// Apply one input event immediately
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerPressed { button, position } => {
                self.input.set_pointer(position);
                let world = self.camera.screen_to_world(position);
                match button {
                    PointerButton::Primary => {
                        self.drag.press(&mut self.space, world, self.camera.zoom());
                    }
                    PointerButton::Secondary => {
                        if let Err(err) = self.spawn(EntityKind::Ball, world) {
                            log::warn!("{}", err);
                        }
                    }
                }
            }
            InputEvent::PointerReleased { button, position } => {
                self.input.set_pointer(position);
                if button == PointerButton::Primary {
                    self.drag.release(&mut self.space);
                }
            }
            InputEvent::PointerMoved { position } => {
                self.input.set_pointer(position);
                let world = self.camera.screen_to_world(position);
                self.drag.motion(&mut self.space, world);
            }
            InputEvent::Wheel { direction } => {
                if direction > 0.0 {
                    self.camera.zoom_in();
                } else {
                    self.camera.zoom_out();
                }
            }
            InputEvent::KeyPressed(key) => self.input.press(key),
            InputEvent::KeyReleased(key) => self.input.release(key),
        }
    }

    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    // ==================== Tick ====================

    /// Run one simulation tick without rendering.
    ///
    /// Returns `false`, doing nothing, once the sandbox has been stopped.
    pub fn update(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        for event in self.queue.drain() {
            self.handle_input(event);
        }

        let pan = self.input.pan_delta(self.camera.config().pan_speed);
        if pan != Vec2::ZERO {
            self.camera.pan(pan.x, pan.y);
            let pointer = self.camera.screen_to_world(self.input.pointer());
            self.drag.motion(&mut self.space, pointer);
        }
        self.apply_steering();

        self.space.step();
        self.handlers.dispatch(&mut self.space, &mut self.state);

        self.sweep_marked();
        self.sync_entities();

        self.tick += 1;
        let now = Instant::now();
        if let Some(last) = self.last_tick.replace(now) {
            let elapsed = now.duration_since(last).as_secs_f32();
            if elapsed > 0.0 {
                self.fps = 1.0 / elapsed;
            }
        }
        true
    }

    fn apply_steering(&mut self) {
        let Some(entity) = self.controllable.and_then(|h| self.state.entities.get(h)) else {
            return;
        };
        if entity.marked_for_removal {
            return;
        }
        let direction = self.input.steering();
        if direction == Vec2::ZERO {
            return;
        }
        let force = direction * self.state.tuning.player_force;
        if let Err(err) = self.space.apply_force_at_local_point(entity.body, force, Vec2::ZERO) {
            log::warn!("Cannot steer: {}", err);
        }
    }

    fn sweep_marked(&mut self) {
        let marked: Vec<EntityHandle> = self
            .state
            .entities
            .iter()
            .filter(|(_, e)| e.marked_for_removal)
            .map(|(h, _)| h)
            .collect();
        for handle in marked {
            self.remove(handle);
        }
    }

    fn sync_entities(&mut self) {
        for (handle, entity) in self.state.entities.iter_mut() {
            if let Err(err) = entity.sync(&self.space) {
                log::warn!("Entity {} lost its body: {}", handle, err);
            }
        }
    }

    /// Flip shape outlines on or off. Returns the new setting.
    pub fn toggle_debug_draw(&mut self) -> bool {
        self.debug_draw = !self.debug_draw;
        log::info!("Debug draw {}", if self.debug_draw { "on" } else { "off" });
        self.debug_draw
    }

    pub fn debug_draw_enabled(&self) -> bool {
        self.debug_draw
    }

    /// Render the current state
    pub fn render(&mut self) -> Frame {
        self.canvas.clear(BACKGROUND);
        self.canvas.draw_grid(&self.camera, &self.grid);
        for (_, entity) in self.state.entities.iter() {
            let target = self.camera.apply_to_bounds(entity.bounds);
            self.canvas.blit_sprite(entity.sprite.pixels(), target, entity.angle);
        }
        if self.debug_draw {
            self.space.debug_draw(&mut OutlinePainter {
                canvas: &mut self.canvas,
                camera: &self.camera,
            });
        }

        let overlays = vec![
            TextOverlay::new(format!("FPS: {:.1}", self.fps), Vec2::new(10.0, 10.0)),
            TextOverlay::new(
                format!("Objects: {}", self.state.entities.len()),
                Vec2::new(10.0, 40.0),
            ),
            TextOverlay::new(format!("Score: {}", self.state.score), Vec2::new(10.0, 70.0)),
            TextOverlay::new(
                format!("Zoom: {:.2}x", self.camera.zoom()),
                Vec2::new(10.0, 100.0),
            ),
            TextOverlay::new(HELP_TEXT, Vec2::new(10.0, 10.0))
                .top_right()
                .with_color([200, 200, 200]),
        ];

        Frame {
            tick: self.tick,
            image: self.canvas.take_image(),
            overlays,
        }
    }

    /// Update, render and present one frame. Returns `false` once stopped.
    ///
    /// Presentation failures are logged and do not stop the loop.
    pub fn tick(&mut self, sink: &mut dyn FrameSink) -> bool {
        if !self.update() {
            return false;
        }
        let frame = self.render();
        if let Err(err) = sink.present(&frame) {
            log::warn!("Frame {} not presented: {}", frame.tick, err);
        }
        true
    }

    /// Ask the loop to stop before its next tick
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Flag shared with signal handlers; clearing it stops the loop
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stats(&self) -> SandboxStats {
        SandboxStats {
            entities: self.state.entities.len(),
            score: self.state.score,
            zoom: self.camera.zoom(),
            pan: self.camera.pan_offset(),
            gravity: self.space.gravity(),
            tick: self.tick,
            dragging: self.drag.is_dragging(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn space(&self) -> &PhysicsWorld {
        &self.space
    }

    pub fn event_log(&self) -> &dyn EventLog {
        self.state.log.as_ref()
    }
}

/// Paints shape outlines onto the frame through the camera
struct OutlinePainter<'a> {
    canvas: &'a mut Canvas,
    camera: &'a Camera,
}

impl DebugDraw for OutlinePainter<'_> {
    fn line(&mut self, a: Vec2, b: Vec2) {
        self.canvas.draw_world_line(self.camera, a, b, OUTLINE);
    }
}

/// Static capsule walls just outside the starting view
fn create_boundaries(
    space: &mut PhysicsWorld,
    walls: &BoundaryConfig,
    config: &SandboxConfig,
) -> Result<Vec<RigidBodyHandle>, ConfigError> {
    let (w, h) = (config.camera.view_width, config.camera.view_height);
    let (t, e) = (walls.thickness, walls.extent);
    let segments = [
        (Vec2::new(-e, h + t), Vec2::new(w + e, h + t)),
        (Vec2::new(-t, -e), Vec2::new(-t, h + e)),
        (Vec2::new(w + t, -e), Vec2::new(w + t, h + e)),
        (Vec2::new(-e, -t), Vec2::new(w + e, -t)),
    ];

    let mut bodies = Vec::with_capacity(segments.len());
    for (a, b) in segments {
        let (body, _) = space.create_body_with_collider(
            RigidBodyDesc::fixed(),
            ColliderDesc::new(ColliderShape::segment(a, b, t))
                .with_material(sandbox_physics::PhysicsMaterial::new(
                    walls.friction,
                    walls.restitution,
                ))
                .with_collision_type(CollisionType::NONE),
        )?;
        bodies.push(body);
    }
    log::debug!("Created {} boundary walls", bodies.len());
    Ok(bodies)
}

/// Route a new contact to the entity on side 1 of `event`
fn react(event: &CollisionEvent, space: &mut PhysicsWorld, state: &mut GameState) {
    let Some(handle) = EntityHandle::from_user_data(event.user_data1) else {
        return;
    };
    let Some(entity) = state.entities.get(handle) else {
        return;
    };
    if entity.marked_for_removal {
        return;
    }
    let (Some(own_body), Some(other_body)) = (event.body1, event.body2) else {
        return;
    };
    let (Ok(own), Ok(other)) = (space.body_state(own_body), space.body_state(other_body)) else {
        return;
    };

    let contact = Contact {
        own: &own,
        other: &other,
        other_body,
        other_type: event.type2,
    };
    match entity.kind.on_collision(&contact, &state.tuning, state.dt) {
        Some(Reaction::Impulse { body, impulse }) => {
            if let Err(err) = space.apply_impulse(body, impulse) {
                log::warn!("Bounce impulse dropped: {}", err);
            }
        }
        Some(Reaction::Collect { value }) => {
            state.score += value;
            if let Some(entity) = state.entities.get_mut(handle) {
                entity.marked_for_removal = true;
            }
            state.log.record(&format!("Collected Coin: +{} score", value));
        }
        None => {}
    }
}
