//! Sandbox runner
//!
//! Runs the rigid-body sandbox headless at a fixed 60 Hz cadence, driven by
//! a command script (the built-in demo unless `--script` is given) and,
//! with `--interactive`, by commands typed on stdin.
//!
//! Run with: cargo run --bin sandbox -- [--script FILE] [--interactive]
//!           [--frames DIR] [--every N] [--fast]

mod command;
mod session;

use sandbox_sim::{Sandbox, SandboxConfig};
use sandbox_view::{FrameSink, MemorySink, PngSequenceSink};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::command::{DEMO_SCRIPT, HELP};
use crate::session::Session;

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Options {
    script: Option<PathBuf>,
    interactive: bool,
    frames: Option<PathBuf>,
    every: u64,
    fast: bool,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut options = Options {
            every: 1,
            ..Default::default()
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--script" => options.script = Some(args.next().ok_or("--script needs a file")?.into()),
                "--frames" => options.frames = Some(args.next().ok_or("--frames needs a directory")?.into()),
                "--every" => {
                    let n = args.next().ok_or("--every needs a number")?;
                    options.every = n.parse().map_err(|_| format!("--every: bad number {:?}", n))?;
                }
                "--interactive" | "-i" => options.interactive = true,
                "--fast" => options.fast = true,
                other => return Err(format!("unknown argument {:?}", other)),
            }
        }
        if options.frames.is_none() {
            if let Ok(dir) = std::env::var("SANDBOX_FRAMES") {
                options.frames = Some(dir.into());
            }
        }
        Ok(options)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("usage: sandbox [--script FILE] [--interactive] [--frames DIR] [--every N] [--fast]");
            std::process::exit(2);
        }
    };

    let config = match SandboxConfig::load() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };
    let frame_time = if options.fast {
        Duration::ZERO
    } else {
        Duration::from_secs_f32(config.physics.timestep)
    };

    let sandbox = match Sandbox::new(config) {
        Ok(sandbox) => sandbox,
        Err(err) => {
            log::error!("Cannot start sandbox: {}", err);
            std::process::exit(1);
        }
    };

    let running = sandbox.running_flag();
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Received Ctrl+C, shutting down...");
        running.store(false, Ordering::SeqCst);
    }) {
        log::warn!("Failed to set Ctrl+C handler: {}", e);
    }

    let script = match &options.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::error!("Cannot read script {:?}: {}", path, err);
                std::process::exit(1);
            }
        },
        None if options.interactive => String::new(),
        None => DEMO_SCRIPT.to_string(),
    };

    let mut session = Session::new(sandbox, frame_time).with_script(&script);
    if options.interactive {
        println!("{}", HELP);
        session = session.with_lines(spawn_stdin_reader());
    }

    let mut sink: Box<dyn FrameSink> = match &options.frames {
        Some(dir) => match PngSequenceSink::new(dir, options.every) {
            Ok(sink) => {
                log::info!("Writing every {} frame(s) to {:?}", options.every, dir);
                Box::new(sink)
            }
            Err(err) => {
                log::error!("{}", err);
                std::process::exit(1);
            }
        },
        None => Box::new(MemorySink::new()),
    };

    log::info!("Sandbox running. Press Ctrl+C to exit.");
    while session.step(sink.as_mut()) {}

    let stats = session.sandbox().stats();
    log::info!(
        "Stopped after {} ticks: {} objects, score {}",
        stats.tick,
        stats.entities,
        stats.score
    );
}

/// Forward stdin lines over a channel; the channel closes at end of input
fn spawn_stdin_reader() -> crossbeam_channel::Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let options = Options::parse(Vec::new()).unwrap();
        assert_eq!(options.every, 1);
        assert!(!options.interactive);
        assert!(options.script.is_none());
    }

    #[test]
    fn all_flags() {
        let options = Options::parse(args(&[
            "--script", "demo.txt", "-i", "--frames", "out", "--every", "10", "--fast",
        ]))
        .unwrap();
        assert_eq!(options.script, Some(PathBuf::from("demo.txt")));
        assert_eq!(options.frames, Some(PathBuf::from("out")));
        assert_eq!(options.every, 10);
        assert!(options.interactive && options.fast);
    }

    #[test]
    fn bad_arguments() {
        assert!(Options::parse(args(&["--every", "often"])).is_err());
        assert!(Options::parse(args(&["--script"])).is_err());
        assert!(Options::parse(args(&["--turbo"])).is_err());
    }
}
