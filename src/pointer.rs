//! Pointer tracking with derived velocity and decaying speed.

use glam::Vec2;

use crate::event::{PointerEvent, PointerEventKind, PointerSource};

/// The one active pointer as seen by an animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    /// Position in viewport pixels.
    pub position: Vec2,
    /// Last movement delta, decaying every tick.
    pub velocity: Vec2,
    /// Length of the last movement delta, decaying every tick.
    pub speed: f32,
    /// Whether the pointer is inside the window.
    pub active: bool,
    /// Whether the primary button or a touch is held.
    pub pressed: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            speed: 0.0,
            active: false,
            pressed: false,
        }
    }
}

/// Turns raw pointer events into a [`PointerState`].
///
/// Speed is the Euclidean distance between consecutive samples and decays
/// geometrically by `decay` on every [`tick`](PointerTracker::tick).
#[derive(Debug, Clone)]
pub struct PointerTracker {
    state: PointerState,
    last: Option<Vec2>,
    decay: f32,
    touch_speed: Option<f32>,
}

impl PointerTracker {
    /// Speeds below this are snapped to zero.
    pub const REST: f32 = 1e-4;

    /// Constructs a tracker with the given per-tick decay factor.
    pub fn new(decay: f32) -> Self {
        Self {
            state: PointerState::default(),
            last: None,
            decay: decay.clamp(0.0, 0.999),
            touch_speed: None,
        }
    }

    /// Reports a constant speed for touch moves instead of the measured delta.
    pub fn with_touch_speed(mut self, speed: Option<f32>) -> Self {
        self.touch_speed = speed;
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> &PointerState {
        &self.state
    }

    /// Returns the decay factor.
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Feeds one pointer event.
    pub fn on_event(&mut self, event: &PointerEvent) {
        match event.kind {
            PointerEventKind::Moved => self.on_move(event.x, event.y, event.source),
            PointerEventKind::Pressed => {
                self.state.pressed = true;
                self.state.active = true;
                self.state.position = event.position();
                self.last = Some(event.position());
            }
            PointerEventKind::Released => self.state.pressed = false,
            PointerEventKind::Left => {
                self.state.active = false;
                self.state.pressed = false;
                self.last = None;
            }
            PointerEventKind::Unidentified => {}
        }
    }

    /// Records a movement to `(x, y)`.
    ///
    /// The first sample after entering the window has zero speed.
    pub fn on_move(&mut self, x: f32, y: f32, source: PointerSource) {
        let position = Vec2::new(x, y);
        let delta = self.last.map_or(Vec2::ZERO, |last| position - last);
        self.last = Some(position);

        self.state.position = position;
        self.state.velocity = delta;
        self.state.active = true;
        self.state.speed = match (source, self.touch_speed) {
            (PointerSource::Touch, Some(speed)) => speed,
            _ => delta.length(),
        };
    }

    /// Decays velocity and speed by one tick.
    pub fn tick(&mut self) {
        self.state.speed *= self.decay;
        self.state.velocity *= self.decay;
        if self.state.speed < Self::REST {
            self.state.speed = 0.0;
            self.state.velocity = Vec2::ZERO;
        }
    }

    /// Forgets the previous sample, e.g. after a resize.
    pub fn reset(&mut self) {
        self.state = PointerState::default();
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_is_euclidean_delta() {
        let mut tracker = PointerTracker::new(0.95);
        tracker.on_move(10.0, 10.0, PointerSource::Mouse);
        assert_eq!(tracker.state().speed, 0.0);
        tracker.on_move(13.0, 14.0, PointerSource::Mouse);
        assert_eq!(tracker.state().speed, 5.0);
        assert_eq!(tracker.state().velocity, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_speed_decays_strictly_within_bound() {
        let decay = 0.9;
        let epsilon = 0.01;
        let mut tracker = PointerTracker::new(decay);
        tracker.on_move(0.0, 0.0, PointerSource::Mouse);
        tracker.on_move(30.0, 40.0, PointerSource::Mouse);

        let start = tracker.state().speed;
        let bound = ((epsilon / start).ln() / decay.ln()).ceil() as usize;
        let mut previous = start;
        let mut reached = None;
        for tick in 1..=bound {
            tracker.tick();
            let speed = tracker.state().speed;
            assert!(speed < previous, "speed did not decrease at tick {tick}");
            previous = speed;
            if speed < epsilon && reached.is_none() {
                reached = Some(tick);
            }
        }
        assert!(reached.is_some());
    }

    #[test]
    fn test_speed_snaps_to_rest() {
        let mut tracker = PointerTracker::new(0.5);
        tracker.on_move(0.0, 0.0, PointerSource::Mouse);
        tracker.on_move(1.0, 0.0, PointerSource::Mouse);
        for _ in 0..64 {
            tracker.tick();
        }
        assert_eq!(tracker.state().speed, 0.0);
        assert_eq!(tracker.state().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_touch_speed() {
        let mut measured = PointerTracker::new(0.95);
        measured.on_move(0.0, 0.0, PointerSource::Touch);
        measured.on_move(0.0, 2.0, PointerSource::Touch);
        assert_eq!(measured.state().speed, 2.0);

        let mut constant = PointerTracker::new(0.95).with_touch_speed(Some(15.0));
        constant.on_move(0.0, 0.0, PointerSource::Touch);
        assert_eq!(constant.state().speed, 15.0);
        constant.on_move(0.0, 1.0, PointerSource::Mouse);
        assert_eq!(constant.state().speed, 1.0);
    }

    #[test]
    fn test_leave_restarts_delta() {
        let mut tracker = PointerTracker::new(0.95);
        tracker.on_move(0.0, 0.0, PointerSource::Mouse);
        tracker.on_event(&PointerEvent::left());
        assert!(!tracker.state().active);
        tracker.on_move(500.0, 500.0, PointerSource::Mouse);
        assert_eq!(tracker.state().speed, 0.0);
        assert!(tracker.state().active);
    }
}
