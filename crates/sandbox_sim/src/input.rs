//! Input events and held-key state
//!
//! Producers (a window, a script, a test) push [`InputEvent`]s into an
//! [`InputQueue`]. The sandbox drains the queue at the top of every tick, so
//! all input observed by one step was delivered before that step began.

use crossbeam_channel::{Receiver, Sender};
use glam::Vec2;
use std::collections::HashSet;
use std::str::FromStr;

/// Keys the sandbox reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Left,
    Right,
    Up,
    Down,
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" => Ok(Key::W),
            "a" => Ok(Key::A),
            "s" => Ok(Key::S),
            "d" => Ok(Key::D),
            "left" | "arrowleft" => Ok(Key::Left),
            "right" | "arrowright" => Ok(Key::Right),
            "up" | "arrowup" => Ok(Key::Up),
            "down" | "arrowdown" => Ok(Key::Down),
            other => Err(format!("unknown key {:?}", other)),
        }
    }
}

/// Pointer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Drags bodies
    Primary,
    /// Spawns a ball
    Secondary,
}

/// A discrete input event; positions are in view space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerPressed { button: PointerButton, position: Vec2 },
    PointerReleased { button: PointerButton, position: Vec2 },
    PointerMoved { position: Vec2 },
    /// Positive zooms in, anything else zooms out
    Wheel { direction: f32 },
    KeyPressed(Key),
    KeyReleased(Key),
}

/// Keys currently held and the last pointer position
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    pointer: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    /// Release a key; releasing a key that was never pressed is fine
    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn set_pointer(&mut self, position: Vec2) {
        self.pointer = position;
    }

    /// Last known pointer position in view space
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Unit steering direction from WASD, or zero
    pub fn steering(&self) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if self.is_held(Key::W) {
            direction.y -= 1.0;
        }
        if self.is_held(Key::S) {
            direction.y += 1.0;
        }
        if self.is_held(Key::A) {
            direction.x -= 1.0;
        }
        if self.is_held(Key::D) {
            direction.x += 1.0;
        }
        direction.normalize_or_zero()
    }

    /// View-space pan delta from the arrow keys
    pub fn pan_delta(&self, speed: f32) -> Vec2 {
        let mut delta = Vec2::ZERO;
        if self.is_held(Key::Left) {
            delta.x -= speed;
        }
        if self.is_held(Key::Right) {
            delta.x += speed;
        }
        if self.is_held(Key::Up) {
            delta.y -= speed;
        }
        if self.is_held(Key::Down) {
            delta.y += speed;
        }
        delta
    }

    /// Forget all held keys
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

/// Multi-producer queue of input events
pub struct InputQueue {
    sender: Sender<InputEvent>,
    receiver: Receiver<InputEvent>,
}

impl Default for InputQueue {
    fn default() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle producers can clone and move to other threads
    pub fn sender(&self) -> Sender<InputEvent> {
        self.sender.clone()
    }

    pub fn push(&self, event: InputEvent) {
        // The receiver lives as long as self, so this cannot fail.
        let _ = self.sender.send(event);
    }

    /// Everything queued so far, in arrival order
    pub fn drain(&self) -> Vec<InputEvent> {
        self.receiver.try_iter().collect()
    }
}
