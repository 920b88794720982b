//! Fixed-cadence session driving a sandbox from commands

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use sandbox_sim::{InputEvent, Sandbox};
use sandbox_view::FrameSink;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::command::{Command, HELP};

/// Feeds script lines and shell input into a sandbox, one tick at a time
pub struct Session {
    sandbox: Sandbox,
    input: Sender<InputEvent>,
    script: VecDeque<String>,
    lines: Option<Receiver<String>>,
    waiting: u64,
    frame_time: Duration,
}

impl Session {
    pub fn new(sandbox: Sandbox, frame_time: Duration) -> Self {
        let input = sandbox.input_sender();
        Self {
            sandbox,
            input,
            script: VecDeque::new(),
            lines: None,
            waiting: 0,
            frame_time,
        }
    }

    /// Queue script lines; blank lines and `#` comments are skipped
    pub fn with_script(mut self, text: &str) -> Self {
        self.script.extend(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(String::from),
        );
        self
    }

    /// Also read commands from a line channel (an stdin reader)
    pub fn with_lines(mut self, lines: Receiver<String>) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    fn next_line(&mut self) -> Option<String> {
        if let Some(line) = self.script.pop_front() {
            return Some(line);
        }
        let lines = self.lines.as_ref()?;
        match lines.try_recv() {
            Ok(line) => Some(line),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::info!("Command input closed");
                self.lines = None;
                None
            }
        }
    }

    /// Whether anything can still produce commands
    fn has_source(&self) -> bool {
        !self.script.is_empty() || self.lines.is_some()
    }

    pub fn execute(&mut self, command: Command) {
        match command {
            Command::Spawn { kind, at } => {
                let result = match at {
                    Some(position) => self.sandbox.spawn(kind, position),
                    None => self.sandbox.spawn_at_view_center(kind),
                };
                if let Err(err) = result {
                    log::warn!("{}", err);
                }
            }
            Command::Gravity(gravity) => self.sandbox.set_gravity(gravity.x, gravity.y),
            Command::Reset => self.sandbox.reset(),
            Command::ToggleDebugDraw => {
                self.sandbox.toggle_debug_draw();
            }
            Command::Input(event) => {
                // Delivered at the top of the next tick.
                let _ = self.input.send(event);
            }
            Command::Wait(ticks) => self.waiting = ticks,
            Command::Stats => {
                let stats = self.sandbox.stats();
                log::info!(
                    "tick {} | objects {} | score {} | zoom {:.2} | pan ({:.1}, {:.1}) | gravity ({}, {}) | dragging {}",
                    stats.tick,
                    stats.entities,
                    stats.score,
                    stats.zoom,
                    stats.pan.x,
                    stats.pan.y,
                    stats.gravity.x,
                    stats.gravity.y,
                    stats.dragging
                );
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {
                log::info!("Quit requested");
                self.sandbox.stop();
            }
        }
    }

    /// Run commands until a wait, then tick once.
    ///
    /// Returns `false` when the sandbox stopped or every command source is
    /// exhausted.
    pub fn step(&mut self, sink: &mut dyn FrameSink) -> bool {
        let started = Instant::now();

        while self.waiting == 0 && self.sandbox.is_running() {
            let Some(line) = self.next_line() else {
                break;
            };
            match line.parse::<Command>() {
                Ok(command) => self.execute(command),
                Err(err) => log::warn!("{}: {}", line, err),
            }
        }

        if self.waiting == 0 && !self.has_source() {
            return false;
        }
        if !self.sandbox.tick(sink) {
            return false;
        }
        self.waiting = self.waiting.saturating_sub(1);

        if let Some(rest) = self.frame_time.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
        true
    }
}
