//! On-screen joystick widget.

use egui::{
    Color32, Context, CornerRadius, CursorIcon, Id, Pos2, Rect, Response, Sense, Stroke,
    StrokeKind, Ui, Vec2, vec2,
};
use touchstick_core::{
    AnimationIntent, AnimationSink, JoystickHandler, JoystickSession, JoystickShape, SessionPhase,
    background_bounds,
};

use crate::{sizing, theme};

/// Distance (in points) at which a spring release counts as settled.
const SETTLE_DISTANCE: f32 = 0.5;

/// Style configuration for the joystick widget.
#[derive(Clone)]
pub struct JoystickStyle {
    /// Track fill color
    pub track_color: Color32,
    /// Track outline
    pub track_stroke: Stroke,
    /// Handle fill color
    pub handle_color: Color32,
    /// Handle fill color while dragging
    pub active_handle_color: Color32,
    /// Handle outline
    pub handle_stroke: Stroke,
    /// Duration of the spring back to the sticky target, in seconds
    pub spring_time: f32,
}

impl Default for JoystickStyle {
    fn default() -> Self {
        Self {
            track_color: theme::TRACK_BG,
            track_stroke: Stroke::new(1.0, theme::BORDER),
            handle_color: Color32::BLACK,
            active_handle_color: theme::ACCENT,
            handle_stroke: Stroke::NONE,
            spring_time: 0.2,
        }
    }
}

/// Plays position instructions through egui's animation state.
struct HandleAnimator<'a> {
    ctx: &'a Context,
    id: Id,
    spring_time: f32,
    position: Vec2,
}

impl AnimationSink for HandleAnimator<'_> {
    fn animate_to(&mut self, target: kurbo::Vec2, intent: AnimationIntent) {
        let time = match intent {
            AnimationIntent::None => 0.0,
            AnimationIntent::Spring => self.spring_time,
        };
        self.position = vec2(
            self.ctx
                .animate_value_with_time(self.id.with("x"), target.x as f32, time),
            self.ctx
                .animate_value_with_time(self.id.with("y"), target.y as f32, time),
        );
    }
}

/// A draggable joystick handle constrained to its track.
///
/// The widget owns no joystick state: the host keeps the
/// [`JoystickSession`] alive across frames and lends it to the widget.
pub struct JoystickWidget<'a> {
    session: &'a mut JoystickSession,
    style: JoystickStyle,
    handle_only: bool,
    id_salt: Option<Id>,
}

impl<'a> JoystickWidget<'a> {
    /// Create a widget driving the given session.
    pub fn new(session: &'a mut JoystickSession) -> Self {
        Self {
            session,
            style: JoystickStyle::default(),
            handle_only: false,
            id_salt: None,
        }
    }

    /// Set the widget style.
    pub fn style(mut self, style: JoystickStyle) -> Self {
        self.style = style;
        self
    }

    /// Only start a drag when the press lands on the handle itself.
    pub fn handle_only(mut self, handle_only: bool) -> Self {
        self.handle_only = handle_only;
        self
    }

    /// Salt for the widget id, needed when several joysticks share a `Ui`.
    pub fn id_salt(mut self, salt: impl std::hash::Hash) -> Self {
        self.id_salt = Some(Id::new(salt));
        self
    }

    /// Show the joystick, forwarding callbacks to `handler`.
    pub fn show<H: JoystickHandler + ?Sized>(mut self, ui: &mut Ui, handler: &mut H) -> Response {
        let track = background_bounds(self.session.config());
        let size = vec2(track.width() as f32, track.height() as f32)
            .max(vec2(sizing::SMALL, sizing::SMALL));
        let (rect, response) = ui.allocate_exact_size(size, Sense::drag());
        let id = self.id_salt.map_or(response.id, |salt| response.id.with(salt));

        // Widget space <-> joystick space: the track's top-left maps to rect.min.
        let origin = rect.min - vec2(track.x0 as f32, track.y0 as f32);
        let to_joystick =
            |p: Pos2| kurbo::Point::new((p.x - origin.x) as f64, (p.y - origin.y) as f64);

        let press = ui.input(|i| i.pointer.press_origin());
        if response.drag_started() {
            let on_handle = press.is_some_and(|p| self.session.includes(to_joystick(p)));
            if on_handle || !self.handle_only {
                self.session.touch_start(handler);
            }
        }

        if self.session.is_dragging() {
            let delta = match (press, response.interact_pointer_pos()) {
                (Some(from), Some(to)) => {
                    let d = to - from;
                    Some(kurbo::Vec2::new(d.x as f64, d.y as f64))
                }
                _ => None,
            };
            if response.drag_stopped() {
                let raw = delta.unwrap_or_else(|| self.session.last_delta());
                self.session.touch_end(raw, handler);
            } else if let Some(raw) = delta.filter(|_| response.drag_delta() != Vec2::ZERO) {
                self.session.touch_move(raw, handler);
            }
        }

        let mut animator = HandleAnimator {
            ctx: ui.ctx(),
            id,
            spring_time: self.style.spring_time,
            position: Vec2::ZERO,
        };
        let instruction = self.session.instruction();
        instruction.send_to(&mut animator);
        let handle_offset = animator.position;

        if self.session.phase() == SessionPhase::Releasing {
            let target = vec2(instruction.displacement.x as f32, instruction.displacement.y as f32);
            if (handle_offset - target).length() < SETTLE_DISTANCE {
                self.session.animation_finished();
            } else {
                ui.ctx().request_repaint();
            }
        }

        if ui.is_rect_visible(rect) {
            let neutral = self.session.config().neutral_point();
            let center = origin + vec2(neutral.x as f32, neutral.y as f32);
            self.paint_track(ui, rect, center);
            self.paint_handle(ui, center + handle_offset);
        }

        if self.session.is_dragging() {
            response.on_hover_cursor(CursorIcon::Grabbing)
        } else {
            response.on_hover_cursor(CursorIcon::Grab)
        }
    }

    fn paint_track(&self, ui: &Ui, rect: Rect, center: Pos2) {
        let config = self.session.config();
        let handle = config.handle_size();
        let painter = ui.painter();
        match config.shape() {
            JoystickShape::Circular => {
                let radius = (config.length() + handle.width.max(handle.height) / 2.0) as f32;
                painter.circle_filled(center, radius, self.style.track_color);
                painter.circle_stroke(center, radius, self.style.track_stroke);
            }
            JoystickShape::Vertical | JoystickShape::Horizontal => {
                let corner = (handle.width.min(handle.height) / 2.0).min(u8::MAX as f64) as u8;
                painter.rect_filled(rect, CornerRadius::same(corner), self.style.track_color);
                painter.rect_stroke(
                    rect,
                    CornerRadius::same(corner),
                    self.style.track_stroke,
                    StrokeKind::Inside,
                );
            }
        }
    }

    fn paint_handle(&self, ui: &Ui, center: Pos2) {
        let handle = self.session.config().handle_size();
        let size = vec2(handle.width as f32, handle.height as f32);
        let fill = if self.session.is_dragging() {
            self.style.active_handle_color
        } else {
            self.style.handle_color
        };
        let rect = Rect::from_center_size(center, size);
        let corner = (size.x.min(size.y) / 2.0).min(u8::MAX as f32) as u8;
        ui.painter().rect_filled(rect, CornerRadius::same(corner), fill);
        if self.style.handle_stroke != Stroke::NONE {
            ui.painter().rect_stroke(
                rect,
                CornerRadius::same(corner),
                self.style.handle_stroke,
                StrokeKind::Outside,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchstick_core::{JoystickConfig, NoopHandler};

    fn run_frame(session: &mut JoystickSession) -> Rect {
        let ctx = Context::default();
        let mut rect = Rect::NOTHING;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                rect = JoystickWidget::new(&mut *session).show(ui, &mut NoopHandler).rect;
            });
        });
        rect
    }

    #[test]
    fn test_allocates_track_size() {
        let config = JoystickConfig::new(JoystickShape::Horizontal, 50.0).unwrap();
        let mut session = JoystickSession::new(config);
        let rect = run_frame(&mut session);
        assert_eq!(rect.size(), vec2(130.0, 30.0));
    }

    #[test]
    fn test_idle_session_untouched_without_input() {
        let config = JoystickConfig::new(JoystickShape::Circular, 40.0).unwrap();
        let mut session = JoystickSession::new(config);
        run_frame(&mut session);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.displacement(), kurbo::Vec2::ZERO);
    }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl JoystickHandler for Recorder {
        fn on_start(&mut self) {
            self.0.push("start".to_string());
        }
        fn on_move(&mut self, v: kurbo::Vec2) {
            self.0.push(format!("move {:.3} {:.3}", v.x, v.y));
        }
        fn on_release(&mut self, v: kurbo::Vec2) {
            self.0.push(format!("release {:.3} {:.3}", v.x, v.y));
        }
    }

    /// Drives one widget through timed frames of pointer input.
    struct PointerDriver {
        ctx: Context,
        time: f64,
        handle_only: bool,
        rect: Rect,
    }

    impl PointerDriver {
        fn new(session: &mut JoystickSession, handle_only: bool) -> Self {
            let mut driver = Self {
                ctx: Context::default(),
                time: 0.0,
                handle_only,
                rect: Rect::NOTHING,
            };
            driver.frame(session, &mut Recorder::default(), Vec::new());
            driver
        }

        fn frame(
            &mut self,
            session: &mut JoystickSession,
            handler: &mut Recorder,
            events: Vec<egui::Event>,
        ) {
            self.time += 0.1;
            let input = egui::RawInput {
                events,
                time: Some(self.time),
                ..Default::default()
            };
            let handle_only = self.handle_only;
            let mut rect = self.rect;
            let _ = self.ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    rect = JoystickWidget::new(&mut *session)
                        .handle_only(handle_only)
                        .show(ui, &mut *handler)
                        .rect;
                });
            });
            self.rect = rect;
        }

        fn press(&mut self, session: &mut JoystickSession, handler: &mut Recorder, offset: Vec2) {
            let pos = self.rect.center() + offset;
            self.frame(
                session,
                handler,
                vec![egui::Event::PointerMoved(pos), button(pos, true)],
            );
        }

        fn drag_to(&mut self, session: &mut JoystickSession, handler: &mut Recorder, offset: Vec2) {
            let pos = self.rect.center() + offset;
            self.frame(session, handler, vec![egui::Event::PointerMoved(pos)]);
        }

        fn release(&mut self, session: &mut JoystickSession, handler: &mut Recorder, offset: Vec2) {
            let pos = self.rect.center() + offset;
            self.frame(session, handler, vec![button(pos, false)]);
        }
    }

    fn button(pos: Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn test_drag_moves_and_keeps_residual() {
        let config = JoystickConfig::new(JoystickShape::Circular, 40.0).unwrap();
        let mut session = JoystickSession::new(config);
        let mut log = Recorder::default();
        let mut driver = PointerDriver::new(&mut session, false);

        driver.press(&mut session, &mut log, Vec2::ZERO);
        driver.drag_to(&mut session, &mut log, vec2(20.0, 0.0));
        driver.drag_to(&mut session, &mut log, vec2(80.0, 0.0));
        assert!(session.is_dragging());
        driver.release(&mut session, &mut log, vec2(80.0, 0.0));

        assert_eq!(
            log.0,
            ["start", "move 0.500 0.000", "move 1.000 0.000", "release 1.000 0.000"]
        );
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.residual_offset(), kurbo::Vec2::new(40.0, 0.0));
    }

    #[test]
    fn test_sticky_drag_springs_back() {
        let config = JoystickConfig::new(JoystickShape::Circular, 40.0)
            .unwrap()
            .with_sticky(kurbo::Vec2::ZERO)
            .unwrap();
        let mut session = JoystickSession::new(config);
        let mut log = Recorder::default();
        let mut driver = PointerDriver::new(&mut session, false);

        driver.press(&mut session, &mut log, Vec2::ZERO);
        driver.drag_to(&mut session, &mut log, vec2(20.0, 0.0));
        driver.drag_to(&mut session, &mut log, vec2(80.0, 0.0));
        driver.release(&mut session, &mut log, vec2(80.0, 0.0));
        assert_eq!(session.phase(), SessionPhase::Releasing);
        assert_eq!(log.0[log.0.len() - 2..], ["move 0.000 0.000", "release 0.000 0.000"]);

        for _ in 0..10 {
            driver.frame(&mut session, &mut log, Vec::new());
        }
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.residual_offset(), kurbo::Vec2::ZERO);
    }

    #[test]
    fn test_handle_only_ignores_press_off_handle() {
        let config = JoystickConfig::new(JoystickShape::Circular, 40.0).unwrap();
        let mut session = JoystickSession::new(config);
        let mut log = Recorder::default();
        let mut driver = PointerDriver::new(&mut session, true);

        driver.press(&mut session, &mut log, vec2(30.0, 0.0));
        driver.drag_to(&mut session, &mut log, vec2(60.0, 0.0));
        driver.release(&mut session, &mut log, vec2(60.0, 0.0));

        assert!(log.0.is_empty());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.displacement(), kurbo::Vec2::ZERO);
    }

    #[test]
    fn test_animator_jumps_without_spring() {
        let ctx = Context::default();
        let mut animator = HandleAnimator {
            ctx: &ctx,
            id: Id::new("joystick"),
            spring_time: 0.2,
            position: Vec2::ZERO,
        };
        animator.animate_to(kurbo::Vec2::new(12.0, -4.0), AnimationIntent::None);
        assert_eq!(animator.position, vec2(12.0, -4.0));
    }
}
