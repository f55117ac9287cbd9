//! Drag session state machine.
//!
//! A [`JoystickSession`] turns a stream of gesture events into clamped handle
//! displacements and host callbacks:
//!
//! - `Start` enters `Dragging` and positions the handle at its rest offset
//! - `Move` clamps `raw delta + rest offset` to the track and reports it
//! - `End` either springs back to the sticky target (`Releasing`) or leaves
//!   the handle where it was dropped, carrying the offset into the next drag
//!
//! Rendering and animation playback stay with the host; the session only
//! hands out [`PositionInstruction`]s.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::JoystickConfig;
use crate::constraint::normalize;

/// Phase of the drag session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No touch is active and no animation is pending.
    #[default]
    Idle,
    /// A touch owns the handle.
    Dragging,
    /// The touch ended and the handle is springing to its sticky target.
    Releasing,
}

/// Transition the presentation layer should use to reach the instructed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationIntent {
    /// Jump straight to the target.
    #[default]
    None,
    /// Spring towards the target.
    Spring,
}

/// A gesture event from the host's touch responder.
///
/// Deltas are measured from the point where the touch went down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    Start,
    Move { dx: f64, dy: f64 },
    End { dx: f64, dy: f64 },
}

impl GestureEvent {
    /// The raw delta carried by the event, if any.
    pub fn delta(&self) -> Option<Vec2> {
        match *self {
            GestureEvent::Start => None,
            GestureEvent::Move { dx, dy } | GestureEvent::End { dx, dy } => Some(Vec2::new(dx, dy)),
        }
    }
}

/// Where the handle should be drawn, relative to the neutral point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionInstruction {
    pub displacement: Vec2,
    pub animation: AnimationIntent,
}

impl PositionInstruction {
    pub fn new(displacement: Vec2, animation: AnimationIntent) -> Self {
        Self {
            displacement,
            animation,
        }
    }

    /// Forward this instruction to an animation sink.
    pub fn send_to<S: AnimationSink + ?Sized>(&self, sink: &mut S) {
        sink.animate_to(self.displacement, self.animation);
    }
}

/// Receives joystick callbacks. Every method defaults to a no-op.
///
/// Displacements are normalized: the track boundary has magnitude 1.
pub trait JoystickHandler {
    fn on_start(&mut self) {}
    fn on_move(&mut self, _normalized: Vec2) {}
    fn on_release(&mut self, _normalized: Vec2) {}
}

/// Handler that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl JoystickHandler for NoopHandler {}

/// Closure-based handler. Unset callbacks are no-ops.
#[derive(Default)]
pub struct CallbackHandler<'a> {
    on_start: Option<Box<dyn FnMut() + 'a>>,
    on_move: Option<Box<dyn FnMut(Vec2) + 'a>>,
    on_release: Option<Box<dyn FnMut(Vec2) + 'a>>,
}

impl<'a> CallbackHandler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start(mut self, f: impl FnMut() + 'a) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn on_move(mut self, f: impl FnMut(Vec2) + 'a) -> Self {
        self.on_move = Some(Box::new(f));
        self
    }

    pub fn on_release(mut self, f: impl FnMut(Vec2) + 'a) -> Self {
        self.on_release = Some(Box::new(f));
        self
    }
}

impl JoystickHandler for CallbackHandler<'_> {
    fn on_start(&mut self) {
        if let Some(f) = self.on_start.as_mut() {
            f();
        }
    }

    fn on_move(&mut self, normalized: Vec2) {
        if let Some(f) = self.on_move.as_mut() {
            f(normalized);
        }
    }

    fn on_release(&mut self, normalized: Vec2) {
        if let Some(f) = self.on_release.as_mut() {
            f(normalized);
        }
    }
}

/// Animation capability injected by the presentation layer.
pub trait AnimationSink {
    /// Move the handle to `target` (relative to the neutral point).
    fn animate_to(&mut self, target: Vec2, intent: AnimationIntent);
}

/// Per-instance joystick state.
#[derive(Debug, Clone)]
pub struct JoystickSession {
    config: JoystickConfig,
    phase: SessionPhase,
    /// Offset carried over from the previous non-sticky drag.
    residual: Vec2,
    /// Displacement accumulated in the current drag, relative to the rest offset.
    relative: Vec2,
    /// Last raw delta seen in the current drag.
    last_raw: Vec2,
    instruction: PositionInstruction,
}

impl JoystickSession {
    /// Create an idle session resting at the sticky target (or the center).
    pub fn new(config: JoystickConfig) -> Self {
        let rest = config.sticky_target().unwrap_or(Vec2::ZERO);
        Self {
            config,
            phase: SessionPhase::Idle,
            residual: Vec2::ZERO,
            relative: Vec2::ZERO,
            last_raw: Vec2::ZERO,
            instruction: PositionInstruction::new(rest, AnimationIntent::None),
        }
    }

    pub fn config(&self) -> &JoystickConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == SessionPhase::Dragging
    }

    pub fn residual_offset(&self) -> Vec2 {
        self.residual
    }

    pub fn relative_displacement(&self) -> Vec2 {
        self.relative
    }

    /// Last raw delta applied in the current drag.
    pub fn last_delta(&self) -> Vec2 {
        self.last_raw
    }

    /// The latest position instruction for the presentation layer.
    pub fn instruction(&self) -> PositionInstruction {
        self.instruction
    }

    /// Current handle displacement from the neutral point.
    pub fn displacement(&self) -> Vec2 {
        self.rest_offset() + self.relative
    }

    /// Current displacement divided by the track length.
    pub fn normalized(&self) -> Vec2 {
        normalize(self.displacement(), self.config.length())
    }

    /// Where a new drag starts from: the sticky target, or the residual offset.
    pub fn rest_offset(&self) -> Vec2 {
        self.config.sticky_target().unwrap_or(self.residual)
    }

    /// Begin a drag.
    pub fn touch_start<H: JoystickHandler + ?Sized>(
        &mut self,
        handler: &mut H,
    ) -> PositionInstruction {
        if self.phase == SessionPhase::Dragging {
            log::warn!("touch start while already dragging, ignoring");
            return self.instruction;
        }
        if self.phase == SessionPhase::Releasing {
            log::debug!("touch start interrupted release animation");
        }

        self.phase = SessionPhase::Dragging;
        self.relative = Vec2::ZERO;
        self.last_raw = Vec2::ZERO;
        self.instruction = PositionInstruction::new(self.rest_offset(), AnimationIntent::None);
        handler.on_start();
        self.instruction
    }

    /// Update the drag with the raw delta from the touch-down point.
    pub fn touch_move<H: JoystickHandler + ?Sized>(
        &mut self,
        raw: Vec2,
        handler: &mut H,
    ) -> PositionInstruction {
        if self.phase != SessionPhase::Dragging {
            log::warn!("touch move outside a drag ({:?}), ignoring", self.phase);
            return self.instruction;
        }

        self.apply_move(raw, handler);
        self.instruction
    }

    /// Finish the drag. `raw` is the final delta from the touch-down point.
    pub fn touch_end<H: JoystickHandler + ?Sized>(
        &mut self,
        raw: Vec2,
        handler: &mut H,
    ) -> PositionInstruction {
        if self.phase != SessionPhase::Dragging {
            log::warn!("touch end outside a drag ({:?}), ignoring", self.phase);
            return self.instruction;
        }

        if raw != self.last_raw {
            self.apply_move(raw, handler);
        }

        let length = self.config.length();
        match self.config.sticky_target() {
            Some(target) => {
                self.relative = Vec2::ZERO;
                self.phase = SessionPhase::Releasing;
                self.instruction = PositionInstruction::new(target, AnimationIntent::Spring);
                let normalized = normalize(target, length);
                handler.on_move(normalized);
                handler.on_release(normalized);
            }
            None => {
                // A tap without movement must not disturb the carried offset.
                if self.relative != Vec2::ZERO {
                    self.residual += self.relative;
                }
                self.relative = Vec2::ZERO;
                self.phase = SessionPhase::Idle;
                self.instruction = PositionInstruction::new(self.residual, AnimationIntent::None);
                handler.on_release(normalize(self.residual, length));
            }
        }
        log::debug!(
            "drag released at {:?}, phase {:?}",
            self.instruction.displacement,
            self.phase
        );
        self.instruction
    }

    /// Signal that the release animation reached its target.
    pub fn animation_finished(&mut self) {
        if self.phase == SessionPhase::Releasing {
            self.phase = SessionPhase::Idle;
        }
    }

    /// Dispatch a gesture event to the matching transition.
    pub fn handle_gesture<H: JoystickHandler + ?Sized>(
        &mut self,
        event: GestureEvent,
        handler: &mut H,
    ) -> PositionInstruction {
        match event {
            GestureEvent::Start => self.touch_start(handler),
            GestureEvent::Move { dx, dy } => self.touch_move(Vec2::new(dx, dy), handler),
            GestureEvent::End { dx, dy } => self.touch_end(Vec2::new(dx, dy), handler),
        }
    }

    /// Drop any drag in progress and re-center the handle.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.residual = Vec2::ZERO;
        self.relative = Vec2::ZERO;
        self.last_raw = Vec2::ZERO;
        self.instruction = PositionInstruction::new(self.rest_offset(), AnimationIntent::None);
    }

    fn apply_move<H: JoystickHandler + ?Sized>(&mut self, raw: Vec2, handler: &mut H) {
        let rest = self.rest_offset();
        let clamped = self.config.constraint().clamp(raw + rest);
        self.last_raw = raw;
        self.relative = clamped - rest;
        self.instruction = PositionInstruction::new(clamped, AnimationIntent::None);
        handler.on_move(normalize(clamped, self.config.length()));
    }
}
