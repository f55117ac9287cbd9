//! Routing of concurrent touches to several joysticks on one surface.

use std::collections::HashMap;

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::JoystickConfig;
use crate::session::{JoystickHandler, JoystickSession, PositionInstruction};

/// Identifier of a joystick owned by a [`JoystickDemux`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JoystickId(pub u32);

/// Identifier of a touch point, as assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TouchId(pub u64);

/// Receives callbacks from every joystick of a demux. Defaults to no-ops.
pub trait DemuxHandler {
    fn on_start(&mut self, _id: JoystickId) {}
    fn on_move(&mut self, _id: JoystickId, _normalized: Vec2) {}
    fn on_release(&mut self, _id: JoystickId, _normalized: Vec2) {}
}

/// Adapts a [`DemuxHandler`] to a single joystick's [`JoystickHandler`].
struct Tagged<'a, H: DemuxHandler + ?Sized> {
    id: JoystickId,
    inner: &'a mut H,
}

impl<H: DemuxHandler + ?Sized> JoystickHandler for Tagged<'_, H> {
    fn on_start(&mut self) {
        self.inner.on_start(self.id);
    }

    fn on_move(&mut self, normalized: Vec2) {
        self.inner.on_move(self.id, normalized);
    }

    fn on_release(&mut self, normalized: Vec2) {
        self.inner.on_release(self.id, normalized);
    }
}

/// A touch currently bound to a joystick.
#[derive(Debug, Clone, Copy)]
struct ActiveTouch {
    joystick: JoystickId,
    origin: Point,
}

/// Owns several joystick sessions and routes touches to them.
///
/// A touch is claimed by the first joystick (in insertion order) whose
/// handle contains the touch-down point. Each joystick follows at most one
/// touch at a time.
#[derive(Debug, Clone, Default)]
pub struct JoystickDemux {
    sessions: HashMap<JoystickId, JoystickSession>,
    /// Hit-test order.
    order: Vec<JoystickId>,
    touches: HashMap<TouchId, ActiveTouch>,
    next_id: u32,
}

impl JoystickDemux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a joystick and return its id.
    pub fn add(&mut self, config: JoystickConfig) -> JoystickId {
        let mut id = JoystickId(self.next_id);
        while self.sessions.contains_key(&id) {
            id = JoystickId(id.0.wrapping_add(1));
        }
        self.next_id = id.0.wrapping_add(1);
        self.sessions.insert(id, JoystickSession::new(config));
        self.order.push(id);
        id
    }

    /// Remove a joystick, dropping any touch bound to it.
    pub fn remove(&mut self, id: JoystickId) -> Option<JoystickSession> {
        self.order.retain(|other| *other != id);
        self.touches.retain(|_, touch| touch.joystick != id);
        self.sessions.remove(&id)
    }

    pub fn get(&self, id: JoystickId) -> Option<&JoystickSession> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: JoystickId) -> Option<&mut JoystickSession> {
        self.sessions.get_mut(&id)
    }

    /// Joystick ids in hit-test order.
    pub fn ids(&self) -> &[JoystickId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Joystick currently following `touch`, if any.
    pub fn owner(&self, touch: TouchId) -> Option<JoystickId> {
        self.touches.get(&touch).map(|t| t.joystick)
    }

    /// Find the joystick whose handle contains `point`.
    pub fn hit_test(&self, point: Point) -> Option<JoystickId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.sessions.get(id).is_some_and(|s| s.includes(point)))
    }

    /// Route a new touch. Returns the joystick that claimed it.
    pub fn touch_down<H: DemuxHandler + ?Sized>(
        &mut self,
        touch: TouchId,
        point: Point,
        handler: &mut H,
    ) -> Option<JoystickId> {
        if self.touches.contains_key(&touch) {
            log::warn!("touch {:?} went down twice, ignoring", touch);
            return None;
        }

        let id = self
            .order
            .iter()
            .copied()
            .filter(|id| !self.is_busy(*id))
            .find(|id| self.sessions.get(id).is_some_and(|s| s.includes(point)))?;

        let session = self.sessions.get_mut(&id)?;
        session.touch_start(&mut Tagged { id, inner: handler });
        self.touches.insert(
            touch,
            ActiveTouch {
                joystick: id,
                origin: point,
            },
        );
        log::debug!("touch {:?} claimed by joystick {:?}", touch, id);
        Some(id)
    }

    /// Forward a touch move to its joystick.
    pub fn touch_move<H: DemuxHandler + ?Sized>(
        &mut self,
        touch: TouchId,
        point: Point,
        handler: &mut H,
    ) -> Option<PositionInstruction> {
        let active = *self.touches.get(&touch)?;
        let session = self.sessions.get_mut(&active.joystick)?;
        Some(session.touch_move(
            point - active.origin,
            &mut Tagged {
                id: active.joystick,
                inner: handler,
            },
        ))
    }

    /// Finish a touch and release its joystick.
    pub fn touch_up<H: DemuxHandler + ?Sized>(
        &mut self,
        touch: TouchId,
        point: Point,
        handler: &mut H,
    ) -> Option<PositionInstruction> {
        let active = self.touches.remove(&touch)?;
        let session = self.sessions.get_mut(&active.joystick)?;
        Some(session.touch_end(
            point - active.origin,
            &mut Tagged {
                id: active.joystick,
                inner: handler,
            },
        ))
    }

    fn is_busy(&self, id: JoystickId) -> bool {
        self.touches.values().any(|t| t.joystick == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::JoystickShape;
    use crate::session::SessionPhase;

    #[derive(Default)]
    struct Log(Vec<(JoystickId, &'static str, Vec2)>);

    impl DemuxHandler for Log {
        fn on_start(&mut self, id: JoystickId) {
            self.0.push((id, "start", Vec2::ZERO));
        }
        fn on_move(&mut self, id: JoystickId, normalized: Vec2) {
            self.0.push((id, "move", normalized));
        }
        fn on_release(&mut self, id: JoystickId, normalized: Vec2) {
            self.0.push((id, "release", normalized));
        }
    }

    fn two_sticks() -> (JoystickDemux, JoystickId, JoystickId) {
        let mut demux = JoystickDemux::new();
        let left = demux.add(
            JoystickConfig::new(JoystickShape::Circular, 50.0)
                .unwrap()
                .with_neutral_point(Point::new(100.0, 300.0))
                .unwrap(),
        );
        let right = demux.add(
            JoystickConfig::new(JoystickShape::Vertical, 40.0)
                .unwrap()
                .with_neutral_point(Point::new(500.0, 300.0))
                .unwrap(),
        );
        (demux, left, right)
    }

    #[test]
    fn test_routes_touches_by_handle() {
        let (mut demux, left, right) = two_sticks();
        let mut log = Log::default();

        assert_eq!(demux.touch_down(TouchId(1), Point::new(102.0, 298.0), &mut log), Some(left));
        assert_eq!(demux.touch_down(TouchId(2), Point::new(500.0, 305.0), &mut log), Some(right));
        assert_eq!(demux.owner(TouchId(2)), Some(right));

        demux.touch_move(TouchId(1), Point::new(127.0, 298.0), &mut log);
        demux.touch_move(TouchId(2), Point::new(520.0, 285.0), &mut log);

        assert!(log.0.contains(&(left, "move", Vec2::new(0.5, 0.0))));
        assert!(log.0.contains(&(right, "move", Vec2::new(0.0, -0.5))));
    }

    #[test]
    fn test_miss_is_not_claimed() {
        let (mut demux, _, _) = two_sticks();
        let mut log = Log::default();
        assert_eq!(demux.touch_down(TouchId(1), Point::new(300.0, 300.0), &mut log), None);
        assert!(demux.touch_move(TouchId(1), Point::new(310.0, 300.0), &mut log).is_none());
        assert!(log.0.is_empty());
    }

    #[test]
    fn test_one_touch_per_joystick() {
        let (mut demux, left, _) = two_sticks();
        let mut log = Log::default();
        assert_eq!(demux.touch_down(TouchId(1), Point::new(100.0, 300.0), &mut log), Some(left));
        assert_eq!(demux.touch_down(TouchId(2), Point::new(101.0, 301.0), &mut log), None);
    }

    #[test]
    fn test_touch_up_releases() {
        let (mut demux, left, _) = two_sticks();
        let mut log = Log::default();
        demux.touch_down(TouchId(7), Point::new(100.0, 300.0), &mut log);
        demux.touch_move(TouchId(7), Point::new(100.0, 200.0), &mut log);
        demux.touch_up(TouchId(7), Point::new(100.0, 200.0), &mut log);

        assert_eq!(demux.owner(TouchId(7)), None);
        assert_eq!(log.0.last(), Some(&(left, "release", Vec2::new(0.0, -1.0))));

        let session = demux.get(left).unwrap();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.residual_offset(), Vec2::new(0.0, -50.0));
        // The handle now rests higher up, so a touch at the old center misses it.
        assert_eq!(demux.hit_test(Point::new(100.0, 300.0)), None);
        assert_eq!(demux.hit_test(Point::new(100.0, 250.0)), Some(left));
    }

    #[test]
    fn test_add_wraps_ids_without_reuse() {
        let (mut demux, left, right) = two_sticks();
        demux.next_id = u32::MAX;
        let config = JoystickConfig::new(JoystickShape::Horizontal, 10.0).unwrap();

        let last = demux.add(config.clone());
        assert_eq!(last, JoystickId(u32::MAX));
        // Ids 0 and 1 are still taken, so the counter skips past them.
        let wrapped = demux.add(config);
        assert_eq!(wrapped, JoystickId(2));
        assert_eq!(demux.ids(), &[left, right, last, wrapped]);
    }

    #[test]
    fn test_remove_drops_touches() {
        let (mut demux, left, right) = two_sticks();
        let mut log = Log::default();
        demux.touch_down(TouchId(1), Point::new(100.0, 300.0), &mut log);
        assert!(demux.remove(left).is_some());
        assert_eq!(demux.owner(TouchId(1)), None);
        assert_eq!(demux.ids(), &[right]);
        assert_eq!(demux.len(), 1);
    }
}
