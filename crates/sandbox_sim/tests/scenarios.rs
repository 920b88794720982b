//! End-to-end scenarios for the sandbox loop

use glam::Vec2;
use image::RgbaImage;
use sandbox_asset::{AssetProvider, Sprite};
use sandbox_sim::*;
use sandbox_view::{Anchor, MemorySink};

const OUTLINE: [u8; 4] = [120, 230, 120, 255];

/// Fully transparent 40x20 art, so frames show only grid and outlines
struct ClearArt;

impl AssetProvider for ClearArt {
    fn load_image(&self, _name: &str, _scale: f32) -> Sprite {
        Sprite::new(RgbaImage::new(40, 20))
    }
}

fn config() -> SandboxConfig {
    SandboxConfig::default().with_asset_root(std::env::temp_dir().join("sandbox_scenarios_no_assets"))
}

fn sandbox() -> Sandbox {
    Sandbox::new(config()).unwrap()
}

fn run(sandbox: &mut Sandbox, ticks: usize) {
    for _ in 0..ticks {
        assert!(sandbox.update());
    }
}

#[test]
fn test_reset_clears_entities_and_score() {
    let mut sandbox = sandbox();
    for (i, kind) in EntityKind::ALL.iter().enumerate() {
        sandbox.spawn(*kind, Vec2::new(100.0 + 120.0 * i as f32, 200.0)).unwrap();
    }
    sandbox.spawn(EntityKind::Coin, Vec2::new(100.0, 200.0)).unwrap();
    run(&mut sandbox, 5);
    sandbox.camera_mut().set_zoom(2.0);
    sandbox.camera_mut().pan(40.0, 0.0);

    sandbox.reset();

    let stats = sandbox.stats();
    assert_eq!(stats.entities, 0);
    assert_eq!(stats.score, 0);
    assert_eq!(stats.zoom, 1.0);
    assert_eq!(stats.pan, Vec2::ZERO);
    assert!(sandbox.controllable().is_none());

    // Walls and the pointer body are not entities.
    assert_eq!(sandbox.space().body_count(), 5);
    let messages: Vec<&str> = sandbox
        .event_log()
        .entries()
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert!(messages.ends_with(&["Resetting simulation...", "Simulation reset."]));
}

#[test]
fn test_coin_collected_by_player_in_one_step() {
    let mut sandbox = sandbox();
    let coin = sandbox.spawn(EntityKind::Coin, Vec2::new(100.0, 100.0)).unwrap();
    sandbox.spawn(EntityKind::Controllable, Vec2::new(100.0, 100.0)).unwrap();
    let before = sandbox.entity_count();

    run(&mut sandbox, 1);

    assert_eq!(sandbox.entity_count(), before - 1);
    assert_eq!(sandbox.score(), 10);
    assert!(sandbox.entity(coin).is_none());
    assert!(sandbox
        .event_log()
        .entries()
        .iter()
        .any(|e| e.message == "Collected Coin: +10 score"));

    // The coin is gone, so no further score.
    run(&mut sandbox, 10);
    assert_eq!(sandbox.score(), 10);
}

#[test]
fn test_coin_ignores_other_bodies() {
    let mut sandbox = sandbox();
    sandbox.spawn(EntityKind::Coin, Vec2::new(300.0, 100.0)).unwrap();
    sandbox.spawn(EntityKind::Ball, Vec2::new(300.0, 100.0)).unwrap();
    run(&mut sandbox, 3);
    assert_eq!(sandbox.entity_count(), 2);
    assert_eq!(sandbox.score(), 0);
}

#[test]
fn test_bouncer_never_moves() {
    let mut sandbox = sandbox();
    let start = Vec2::new(500.0, 400.0);
    let bouncer = sandbox.spawn(EntityKind::Bouncer, start).unwrap();
    sandbox.spawn(EntityKind::Ball, Vec2::new(500.0, 300.0)).unwrap();
    sandbox.spawn(EntityKind::Box, Vec2::new(505.0, 250.0)).unwrap();
    let body = sandbox.entity(bouncer).unwrap().body;

    for _ in 0..180 {
        sandbox.update();
        let state = sandbox.space().body_state(body).unwrap();
        assert_eq!(state.position, start);
        assert_eq!(state.angle, 0.0);
    }
    assert_eq!(sandbox.entity(bouncer).unwrap().position(), start);
}

#[test]
fn test_bouncer_throws_ball_upwards() {
    let mut sandbox = sandbox();
    sandbox.spawn(EntityKind::Bouncer, Vec2::new(500.0, 400.0)).unwrap();
    let ball = sandbox.spawn(EntityKind::Ball, Vec2::new(500.0, 300.0)).unwrap();

    let mut highest_after_contact = f32::MAX;
    let mut touched = false;
    for _ in 0..120 {
        sandbox.update();
        let y = sandbox.entity(ball).unwrap().position().y;
        if y > 340.0 {
            touched = true;
        }
        if touched {
            highest_after_contact = highest_after_contact.min(y);
        }
    }
    assert!(touched);
    // Restitution above one plus the impulse sends it higher than it started.
    assert!(highest_after_contact < 300.0);
}

#[test]
fn test_drag_pulls_body_to_pointer() {
    let mut sandbox = Sandbox::new(config().with_gravity(0.0, 0.0)).unwrap();
    let ball = sandbox.spawn(EntityKind::Ball, Vec2::new(300.0, 300.0)).unwrap();
    let sender = sandbox.input_sender();

    sender
        .send(InputEvent::PointerPressed {
            button: PointerButton::Primary,
            position: Vec2::new(300.0, 300.0),
        })
        .unwrap();
    sender
        .send(InputEvent::PointerMoved {
            position: Vec2::new(420.0, 340.0),
        })
        .unwrap();
    run(&mut sandbox, 1);
    assert!(sandbox.is_dragging());

    let target = Vec2::new(420.0, 340.0);
    let mut last = sandbox.entity(ball).unwrap().position().distance(target);
    for _ in 0..6 {
        run(&mut sandbox, 30);
        let distance = sandbox.entity(ball).unwrap().position().distance(target);
        assert!(distance <= last + 1.0);
        last = distance;
    }
    assert!(last < 5.0, "ball stayed {} away from the pointer", last);

    sender
        .send(InputEvent::PointerReleased {
            button: PointerButton::Primary,
            position: target,
        })
        .unwrap();
    run(&mut sandbox, 1);
    assert!(!sandbox.is_dragging());
    assert_eq!(sandbox.space().joint_count(), 0);
}

#[test]
fn test_drag_holds_box_at_pointer_under_gravity() {
    let mut sandbox = sandbox();
    assert_eq!(sandbox.gravity(), Vec2::new(0.0, 900.0));
    let start = Vec2::new(300.0, 300.0);
    let target = Vec2::new(450.0, 150.0);
    let boxed = sandbox.spawn(EntityKind::Box, start).unwrap();
    sandbox.camera_mut().set_zoom(0.2);

    let press = sandbox.camera().world_to_screen(start);
    let aim = sandbox.camera().world_to_screen(target);
    sandbox.handle_input(InputEvent::PointerPressed {
        button: PointerButton::Primary,
        position: press,
    });
    sandbox.handle_input(InputEvent::PointerMoved { position: aim });
    assert!(sandbox.is_dragging());

    run(&mut sandbox, 300);
    let position = sandbox.entity(boxed).unwrap().position();
    assert!(
        position.distance(target) < 0.5,
        "box hangs at {:?}, pointer at {:?}",
        position,
        target
    );

    // Still held there, not sagging over time.
    run(&mut sandbox, 120);
    assert!(sandbox.entity(boxed).unwrap().position().distance(target) < 0.5);
}

#[test]
fn test_press_on_empty_space_or_static_body_creates_no_joint() {
    let mut sandbox = sandbox();
    sandbox.spawn(EntityKind::Bouncer, Vec2::new(600.0, 300.0)).unwrap();

    for position in [Vec2::new(600.0, 300.0), Vec2::new(200.0, 100.0)] {
        sandbox.handle_input(InputEvent::PointerPressed {
            button: PointerButton::Primary,
            position,
        });
        assert!(!sandbox.is_dragging());
        assert_eq!(sandbox.space().joint_count(), 0);
    }
}

#[test]
fn test_removing_dragged_entity_releases_drag() {
    let mut sandbox = Sandbox::new(config().with_gravity(0.0, 0.0)).unwrap();
    let ball = sandbox.spawn(EntityKind::Ball, Vec2::new(200.0, 200.0)).unwrap();
    sandbox.handle_input(InputEvent::PointerPressed {
        button: PointerButton::Primary,
        position: Vec2::new(200.0, 200.0),
    });
    assert!(sandbox.is_dragging());

    assert!(sandbox.mark_for_removal(ball));
    run(&mut sandbox, 1);
    assert!(!sandbox.is_dragging());
    assert_eq!(sandbox.entity_count(), 0);
}

#[test]
fn test_double_removal_is_harmless() {
    let mut sandbox = sandbox();
    let a = sandbox.spawn(EntityKind::Ball, Vec2::new(100.0, 100.0)).unwrap();
    let b = sandbox.spawn(EntityKind::Box, Vec2::new(300.0, 100.0)).unwrap();

    assert!(sandbox.remove(a));
    assert!(!sandbox.remove(a));
    assert!(!sandbox.mark_for_removal(a));
    assert_eq!(sandbox.entity_count(), 1);
    assert!(sandbox.entity(b).is_some());
    run(&mut sandbox, 2);
    assert!(sandbox.entity(b).is_some());
}

#[test]
fn test_unknown_tag_spawns_nothing() {
    let mut sandbox = sandbox();
    let result = sandbox.spawn_named("rocket", Vec2::ZERO);
    assert!(matches!(result, Err(SpawnError::UnknownKind(_))));
    assert_eq!(sandbox.entity_count(), 0);

    assert!(sandbox.spawn_named("coin", Vec2::new(10.0, 10.0)).is_ok());
    assert_eq!(sandbox.entity_count(), 1);
}

#[test]
fn test_new_controllable_replaces_old() {
    let mut sandbox = sandbox();
    let first = sandbox.spawn(EntityKind::Controllable, Vec2::new(100.0, 100.0)).unwrap();
    let second = sandbox.spawn_named("player", Vec2::new(400.0, 100.0)).unwrap();

    assert_eq!(sandbox.entity_count(), 1);
    assert_eq!(sandbox.controllable(), Some(second));
    assert!(sandbox.entity(first).is_none());
}

#[test]
fn test_spawn_at_view_center_follows_camera() {
    let mut sandbox = sandbox();
    sandbox.camera_mut().pan(100.0, 50.0);
    sandbox.camera_mut().set_zoom(2.0);
    let handle = sandbox.spawn_at_view_center(EntityKind::Ball).unwrap();
    let position = sandbox.entity(handle).unwrap().position();
    assert!((position - Vec2::new(600.0, 350.0)).length() < 1e-3);
}

#[test]
fn test_falling_ball_lands_on_floor() {
    let mut sandbox = sandbox();
    let ball = sandbox.spawn(EntityKind::Ball, Vec2::new(500.0, 100.0)).unwrap();
    run(&mut sandbox, 600);
    let y = sandbox.entity(ball).unwrap().position().y;
    // Floor wall surface sits at the bottom edge of the view.
    assert!(y > 500.0 && y <= 600.0, "ball at y = {}", y);
}

#[test]
fn test_gravity_change_is_visible_in_stats() {
    let mut sandbox = sandbox();
    sandbox.set_gravity(0.0, -200.0);
    assert_eq!(sandbox.stats().gravity, Vec2::new(0.0, -200.0));
}

#[test]
fn test_frame_has_hud_overlays() {
    let mut sandbox = sandbox();
    sandbox.spawn(EntityKind::Box, Vec2::new(500.0, 300.0)).unwrap();
    let mut sink = MemorySink::new();
    assert!(sandbox.tick(&mut sink));

    let frame = sink.last_frame().unwrap();
    assert_eq!(frame.tick, 1);
    assert_eq!(frame.image.dimensions(), (1000, 600));

    let texts: Vec<&str> = frame.overlays.iter().map(|o| o.text.as_str()).collect();
    assert!(texts[0].starts_with("FPS: "));
    assert_eq!(texts[1], "Objects: 1");
    assert_eq!(texts[2], "Score: 0");
    assert_eq!(texts[3], "Zoom: 1.00x");
    let help = frame.overlays.last().unwrap();
    assert_eq!(help.anchor, Anchor::TopRight);
    assert_eq!(help.color, [200, 200, 200]);

    // The placeholder box covers the view center.
    assert_ne!(frame.image.get_pixel(500, 300).0, [30, 30, 40, 255]);
}

#[test]
fn test_stop_ends_the_loop() {
    let mut sandbox = sandbox();
    let flag = sandbox.running_flag();
    let mut sink = MemorySink::new();
    assert!(sandbox.tick(&mut sink));
    flag.store(false, std::sync::atomic::Ordering::SeqCst);
    assert!(!sandbox.tick(&mut sink));
    assert_eq!(sink.presented(), 1);
}

#[test]
fn test_debug_draw_outlines_shapes_through_camera() {
    let mut sandbox = Sandbox::new(config().with_gravity(0.0, 0.0))
        .unwrap()
        .with_assets(ClearArt);
    sandbox.spawn(EntityKind::Ball, Vec2::new(500.0, 300.0)).unwrap();
    sandbox.spawn(EntityKind::Box, Vec2::new(300.0, 300.0)).unwrap();
    sandbox.camera_mut().set_zoom(0.5);

    // Ball rim at world (512, 300), box corner at (280, 290), floor wall top at y = 600.
    let pixels = [(506, 300), (390, 295), (500, 450)];

    assert!(!sandbox.debug_draw_enabled());
    let plain = sandbox.render();
    for (x, y) in pixels {
        assert_ne!(plain.image.get_pixel(x, y).0, OUTLINE, "({}, {})", x, y);
    }

    assert!(sandbox.toggle_debug_draw());
    let outlined = sandbox.render();
    for (x, y) in pixels {
        assert_eq!(outlined.image.get_pixel(x, y).0, OUTLINE, "({}, {})", x, y);
    }

    assert!(!sandbox.toggle_debug_draw());
    assert_ne!(sandbox.render().image.get_pixel(506, 300).0, OUTLINE);
}

#[test]
fn test_spawn_at_screen_goes_through_camera() {
    let mut sandbox = sandbox();
    sandbox.camera_mut().set_zoom(2.0);
    let handle = sandbox
        .spawn_at_screen(EntityKind::Coin, Vec2::new(700.0, 300.0))
        .unwrap();
    let position = sandbox.entity(handle).unwrap().position();
    assert!((position - Vec2::new(600.0, 300.0)).length() < 1e-3);
}

#[test]
fn test_replacement_event_log_records_spawns() {
    let mut sandbox = sandbox().with_event_log(Box::new(MemoryEventLog::new()));
    assert!(sandbox.event_log().entries().is_empty());
    sandbox.spawn(EntityKind::Coin, Vec2::new(100.0, 100.0)).unwrap();
    assert_eq!(
        sandbox.event_log().entries()[0].message,
        "Added Coin at (100.0, 100.0)"
    );
}

#[test]
fn test_boundaries_can_be_disabled() {
    let sandbox = Sandbox::new(config().with_boundaries(false)).unwrap();
    assert!(sandbox.boundaries().is_empty());
    // Only the pointer body remains.
    assert_eq!(sandbox.space().body_count(), 1);
}

#[test]
fn test_held_keys_track_press_and_release() {
    let mut sandbox = sandbox();
    sandbox.handle_input(InputEvent::KeyPressed(Key::W));
    assert!(sandbox.input_state().is_held(Key::W));
    sandbox.handle_input(InputEvent::KeyReleased(Key::W));
    assert!(!sandbox.input_state().is_held(Key::W));
    // Releasing a key that was never pressed is fine.
    sandbox.handle_input(InputEvent::KeyReleased(Key::Left));
    assert!(!sandbox.input_state().is_held(Key::Left));
}
