//! Touchstick gesture replay
//!
//! Runs a recorded gesture trace through a joystick session and prints every
//! callback as one JSON object per line.
//!
//! ## Trace format
//!
//! ```json
//! {
//!   "joystick": { "shape": "circular", "length": 50, "isSticky": false },
//!   "events": [
//!     { "type": "start" },
//!     { "type": "move", "dx": 80, "dy": 0 },
//!     { "type": "end", "dx": 80, "dy": 0 }
//!   ]
//! }
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use touchstick_core::{ConfigError, GestureEvent, JoystickHandler, JoystickOptions, JoystickSession};

/// Replay errors.
#[derive(Debug, Error)]
enum ReplayError {
    #[error("usage: touchstick-replay <trace.json>")]
    Usage,
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid trace: {0}")]
    Trace(#[from] serde_json::Error),
    #[error("invalid joystick: {0}")]
    Config(#[from] ConfigError),
}

/// A recorded gesture trace.
#[derive(Debug, Deserialize)]
struct Trace {
    joystick: JoystickOptions,
    #[serde(default)]
    events: Vec<GestureEvent>,
}

/// One reported callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Output {
    Start,
    Move { x: f64, y: f64 },
    Release { x: f64, y: f64 },
}

#[derive(Default)]
struct Recorder(Vec<Output>);

impl JoystickHandler for Recorder {
    fn on_start(&mut self) {
        self.0.push(Output::Start);
    }

    fn on_move(&mut self, normalized: Vec2) {
        self.0.push(Output::Move {
            x: normalized.x,
            y: normalized.y,
        });
    }

    fn on_release(&mut self, normalized: Vec2) {
        self.0.push(Output::Release {
            x: normalized.x,
            y: normalized.y,
        });
    }
}

fn replay(trace: &Trace) -> Result<Vec<Output>, ReplayError> {
    let config = trace.joystick.build()?;
    log::info!(
        "Replaying {} events on a {:?} joystick (length {})",
        trace.events.len(),
        config.shape(),
        config.length()
    );

    let mut session = JoystickSession::new(config);
    let mut recorder = Recorder::default();
    for event in &trace.events {
        let instruction = session.handle_gesture(*event, &mut recorder);
        log::debug!("{:?} -> {:?}", event, instruction);
        // Replays have no renderer, so release animations complete at once.
        session.animation_finished();
    }
    Ok(recorder.0)
}

fn load_trace(path: &Path) -> Result<Trace, ReplayError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Extract the trace path from the command line (program name first).
fn trace_path(mut args: impl Iterator<Item = OsString>) -> Result<PathBuf, ReplayError> {
    args.nth(1).map(PathBuf::from).ok_or(ReplayError::Usage)
}

fn run() -> Result<(), ReplayError> {
    let path = trace_path(std::env::args_os())?;
    let trace = load_trace(&path)?;
    for output in replay(&trace)? {
        println!("{}", serde_json::to_string(&output)?);
    }
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
