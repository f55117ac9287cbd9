//! Touchstick Core Library
//!
//! Platform-agnostic logic for on-screen virtual joysticks: clamping drag
//! displacement to a circular or linear track, the drag session state
//! machine, handle hit testing and routing of touches between several
//! joysticks. Rendering and gesture capture live in the host toolkit.

pub mod config;
pub mod constraint;
pub mod demux;
pub mod error;
pub mod layout;
pub mod session;

pub use config::{DEFAULT_HANDLE_SIZE, JoystickConfig, JoystickOptions};
pub use constraint::{JoystickShape, ShapeConstraint, clamp, normalize};
pub use demux::{DemuxHandler, JoystickDemux, JoystickId, TouchId};
pub use error::{ConfigError, ConfigResult};
pub use layout::{background_bounds, top_left_from_center};
pub use session::{
    AnimationIntent, AnimationSink, CallbackHandler, GestureEvent, JoystickHandler, JoystickSession,
    NoopHandler, PositionInstruction, SessionPhase,
};
