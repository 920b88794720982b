//! Shell commands understood by the runner
//!
//! ```text
//! spawn <kind> [x y]    spawn at a world position, or the view center
//! gravity <x> <y>       set gravity
//! reset                 remove everything, zero the score
//! key <name> down|up    hold or release w/a/s/d/left/right/up/down
//! grab <x> <y>          press the primary button at a view position
//! move <x> <y>          move the pointer
//! drop <x> <y>          release the primary button
//! ball <x> <y>          right click (spawns a ball)
//! wheel <dir>           zoom in (positive) or out
//! debug                 toggle shape outlines
//! wait <ticks>          let the simulation run
//! stats                 print a snapshot
//! quit                  stop the loop
//! ```

use glam::Vec2;
use sandbox_sim::{EntityKind, InputEvent, Key, PointerButton};
use std::str::FromStr;

/// One parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Spawn { kind: EntityKind, at: Option<Vec2> },
    Gravity(Vec2),
    Reset,
    Input(InputEvent),
    ToggleDebugDraw,
    Wait(u64),
    Stats,
    Help,
    Quit,
}

pub const HELP: &str = "commands: spawn <kind> [x y] | gravity <x> <y> | reset | key <name> down|up | \
grab/move/drop/ball <x> <y> | wheel <dir> | debug | wait <ticks> | stats | quit";

fn number(word: Option<&str>, what: &str) -> Result<f32, String> {
    let word = word.ok_or_else(|| format!("missing {}", what))?;
    word.parse()
        .map_err(|_| format!("{} is not a number: {:?}", what, word))
}

fn point<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<Vec2, String> {
    let x = number(words.next(), "x")?;
    let y = number(words.next(), "y")?;
    Ok(Vec2::new(x, y))
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or("empty command")?.to_ascii_lowercase();

        let command = match verb.as_str() {
            "spawn" => {
                let tag = words.next().ok_or("spawn needs a kind")?;
                let kind: EntityKind = tag.parse().map_err(|e| format!("{}", e))?;
                let at = match words.next() {
                    Some(x) => Some(Vec2::new(number(Some(x), "x")?, number(words.next(), "y")?)),
                    None => None,
                };
                Command::Spawn { kind, at }
            }
            "gravity" => Command::Gravity(point(&mut words)?),
            "reset" => Command::Reset,
            "key" => {
                let key: Key = words.next().ok_or("key needs a name")?.parse()?;
                match words.next().unwrap_or("down") {
                    "down" => Command::Input(InputEvent::KeyPressed(key)),
                    "up" => Command::Input(InputEvent::KeyReleased(key)),
                    other => return Err(format!("expected down or up, got {:?}", other)),
                }
            }
            "grab" => Command::Input(InputEvent::PointerPressed {
                button: PointerButton::Primary,
                position: point(&mut words)?,
            }),
            "move" => Command::Input(InputEvent::PointerMoved {
                position: point(&mut words)?,
            }),
            "drop" => Command::Input(InputEvent::PointerReleased {
                button: PointerButton::Primary,
                position: point(&mut words)?,
            }),
            "ball" => Command::Input(InputEvent::PointerPressed {
                button: PointerButton::Secondary,
                position: point(&mut words)?,
            }),
            "wheel" => Command::Input(InputEvent::Wheel {
                direction: number(words.next(), "direction")?,
            }),
            "debug" => Command::ToggleDebugDraw,
            "wait" => {
                let ticks = words.next().ok_or("wait needs a tick count")?;
                Command::Wait(
                    ticks
                        .parse()
                        .map_err(|_| format!("bad tick count {:?}", ticks))?,
                )
            }
            "stats" => Command::Stats,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command {:?}", other)),
        };
        Ok(command)
    }
}

/// Commands run when no script is given
pub const DEMO_SCRIPT: &str = "\
spawn bouncer 500 450
spawn box 300 100
spawn box 330 20
spawn ball 520 150
spawn coin 650 560
spawn coin 720 560
spawn player 600 540
wait 60
key d down
wait 45
key d up
grab 300 100
move 200 200
wait 30
move 150 300
wait 30
drop 150 300
wheel 1
wheel 1
key left down
wait 20
key left up
ball 700 100
wait 60
stats
";
