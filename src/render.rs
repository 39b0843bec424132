//! ## Frame loop
//!
//! An [`Animation`] bundles one [`Effect`] with its pointer tracker, the
//! scene it records into and the surface that scene is painted on. A
//! [`FrameLoop`] drives an animation through a [`Host`]: it forwards input
//! events and ticks the animation once per animation frame.
//!
//! ```rust,ignore
//! use vitrine::{effects::{EffectConfig, Ripple}, host::BrowserHost, render::{Animation, FrameLoop}};
//!
//! let host = BrowserHost::new()?;
//! let animation = Animation::new(Box::new(Ripple::new(EffectConfig::new())), None, host.viewport());
//! let mut frame_loop = FrameLoop::new(host, animation);
//! frame_loop.start()?;
//! ```

use std::{cell::RefCell, rc::Rc};

use crate::{
    backend::Surface,
    effects::{Effect, FrameContext},
    error::Error,
    event::{Event, InputKind},
    host::{FrameRequester, Host},
    pointer::{PointerState, PointerTracker},
    scene::{Scene, Viewport},
};

/// One effect wired to a pointer tracker and an optional surface.
pub struct Animation {
    effect: Box<dyn Effect>,
    tracker: PointerTracker,
    scene: Scene,
    surface: Option<Box<dyn Surface>>,
    viewport: Viewport,
    start: Option<f64>,
    last: Option<f64>,
    frame: u64,
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("effect", &self.effect.name())
            .field("surface", &self.surface.as_ref().map(|s| s.kind()))
            .field("viewport", &self.viewport)
            .field("frame", &self.frame)
            .finish()
    }
}

impl Animation {
    /// Constructs a new [`Animation`] and sizes the effect for `viewport`.
    ///
    /// Without a surface the animation still simulates but paints nothing.
    pub fn new(
        mut effect: Box<dyn Effect>,
        surface: Option<Box<dyn Surface>>,
        viewport: Viewport,
    ) -> Self {
        let config = effect.config();
        let tracker = PointerTracker::new(config.speed_decay).with_touch_speed(config.touch_speed);
        effect.resize(viewport);
        Self {
            effect,
            tracker,
            scene: Scene::new(viewport),
            surface,
            viewport,
            start: None,
            last: None,
            frame: 0,
        }
    }

    /// Returns the effect.
    pub fn effect(&self) -> &dyn Effect {
        self.effect.as_ref()
    }

    /// Returns the pointer state.
    pub fn pointer(&self) -> &PointerState {
        self.tracker.state()
    }

    /// Returns the scene recorded by the last tick.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Returns the current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Returns the number of ticks so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Returns `true` if the animation paints on a surface.
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Handles one input event.
    pub fn on_event(&mut self, event: Event) {
        match event {
            Event::Pointer(pointer) => {
                self.tracker.on_event(&pointer);
                self.effect.on_pointer(&pointer, self.tracker.state());
            }
            Event::Resize(viewport) => self.resize(viewport),
        }
    }

    /// Resizes the surface and resets the effect for the new viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.effect.resize(viewport);
        if let Some(surface) = self.surface.as_mut() {
            if let Err(e) = surface.resize(viewport) {
                log::warn!("failed to resize {} surface: {e:?}", surface.kind());
            }
        }
    }

    /// Advances the animation by one frame at `timestamp` milliseconds.
    ///
    /// Runs one simulation step, records and presents the scene, then
    /// decays the pointer speed. A surface that fails to present is dropped
    /// and the animation keeps ticking without it.
    pub fn tick(&mut self, timestamp: f64) {
        let start = *self.start.get_or_insert(timestamp);
        let delta = self.last.map_or(0.0, |last| (timestamp - last).max(0.0));
        self.last = Some(timestamp);

        let pointer = *self.tracker.state();
        let context = FrameContext {
            time: ((timestamp - start) / 1000.0) as f32,
            delta: (delta / 1000.0) as f32,
            frame: self.frame,
            viewport: self.viewport,
            pointer: &pointer,
        };

        self.effect.update(&context);
        self.scene.reset(self.viewport);
        self.effect.draw(&context, &mut self.scene);

        if let Some(surface) = self.surface.as_mut() {
            if let Err(e) = surface.present(&self.scene) {
                log::error!(
                    "{} stopped painting on {} surface: {e:?}",
                    self.effect.name(),
                    surface.kind()
                );
                self.surface = None;
            }
        }

        self.tracker.tick();
        self.frame += 1;
    }
}

struct LoopState<H: Host> {
    animation: Animation,
    frame: Option<H::Frame>,
    listeners: Vec<H::Listener>,
}

/// Drives an [`Animation`] with a [`Host`].
///
/// Input and frame callbacks only hold weak references to the loop state, so
/// dropping the loop releases the animation even while callbacks are
/// registered. Dropping a running loop stops it.
pub struct FrameLoop<H: Host> {
    host: H,
    state: Rc<RefCell<LoopState<H>>>,
}

impl<H: Host> std::fmt::Debug for FrameLoop<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FrameLoop")
            .field("animation", &state.animation)
            .field("running", &state.frame.is_some())
            .finish()
    }
}

impl<H: Host> FrameLoop<H> {
    /// Constructs a stopped loop.
    pub fn new(host: H, animation: Animation) -> Self {
        Self {
            host,
            state: Rc::new(RefCell::new(LoopState {
                animation,
                frame: None,
                listeners: Vec::new(),
            })),
        }
    }

    /// Cancels the pending frame and detaches every listener.
    ///
    /// Calling `stop` on a stopped loop does nothing.
    pub fn stop(&mut self) {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            log::warn!("stop requested while the loop is busy");
            return;
        };
        if let Some(mut frame) = state.frame.take() {
            frame.cancel();
            log::debug!("stopped {}", state.animation.effect.name());
        }
        state.listeners.clear();
    }

    /// Returns `true` between [`start`](Self::start) and [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.state.borrow().frame.is_some()
    }

    /// Returns the host the loop runs on.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Runs `f` with the animation.
    pub fn with_animation<R>(&self, f: impl FnOnce(&mut Animation) -> R) -> R {
        f(&mut self.state.borrow_mut().animation)
    }
}

impl<H: Host + 'static> FrameLoop<H> {
    /// Registers input listeners and requests the first frame.
    ///
    /// Calling `start` on a running loop does nothing.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.is_running() {
            return Ok(());
        }

        let weak = Rc::downgrade(&self.state);
        let listeners = InputKind::ALL
            .into_iter()
            .map(|kind| {
                let weak = weak.clone();
                self.host.listen(
                    kind,
                    Box::new(move |event| {
                        if let Some(state) = weak.upgrade() {
                            state.borrow_mut().animation.on_event(event);
                        }
                    }),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut frame = self.host.frame(Box::new(move |timestamp| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = state.borrow_mut();
            state.animation.tick(timestamp);
            if let Some(frame) = state.frame.as_mut() {
                if let Err(e) = frame.request() {
                    log::error!("failed to request animation frame: {e:?}");
                }
            }
        }))?;
        frame.request()?;

        let mut state = self.state.borrow_mut();
        log::debug!("started {}", state.animation.effect.name());
        state.listeners = listeners;
        state.frame = Some(frame);
        Ok(())
    }
}

impl<H: Host> Drop for FrameLoop<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::{
        backend::{
            recording::{Recording, RecordingSurface},
            SurfaceKind,
        },
        effects::{EffectConfig, Ripple},
        event::PointerEvent,
        host::testing::TestHost,
        scene::Command,
    };

    struct Probe {
        config: EffectConfig,
        updates: Rc<Cell<u64>>,
        resizes: Rc<RefCell<Vec<Viewport>>>,
    }

    impl Effect for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn config(&self) -> &EffectConfig {
            &self.config
        }

        fn resize(&mut self, viewport: Viewport) {
            self.resizes.borrow_mut().push(viewport);
        }

        fn update(&mut self, _context: &FrameContext) {
            self.updates.set(self.updates.get() + 1);
        }

        fn draw(&mut self, context: &FrameContext, scene: &mut Scene) {
            scene.circle(context.pointer.position, context.pointer.speed, Default::default());
        }
    }

    fn probe() -> (Box<Probe>, Rc<Cell<u64>>, Rc<RefCell<Vec<Viewport>>>) {
        let updates = Rc::new(Cell::new(0));
        let resizes = Rc::new(RefCell::new(Vec::new()));
        let probe = Box::new(Probe {
            config: EffectConfig::new().speed_decay(0.5),
            updates: updates.clone(),
            resizes: resizes.clone(),
        });
        (probe, updates, resizes)
    }

    fn recorded_loop(host: &TestHost) -> (FrameLoop<TestHost>, Rc<RefCell<Recording>>) {
        let (surface, recording) = RecordingSurface::new(SurfaceKind::Canvas);
        let effect = Box::new(Ripple::new(EffectConfig::new().grid(32)));
        let animation = Animation::new(effect, Some(Box::new(surface)), host.viewport());
        (FrameLoop::new(host.clone(), animation), recording)
    }

    #[test]
    fn test_ticks_once_per_frame_and_rerequests() {
        let host = TestHost::default();
        let (probe, updates, _) = probe();
        let (surface, recording) = RecordingSurface::new(SurfaceKind::Canvas);
        let mut frame_loop = FrameLoop::new(
            host.clone(),
            Animation::new(probe, Some(Box::new(surface)), host.viewport()),
        );

        frame_loop.start().unwrap();
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(host.listener_count(), InputKind::ALL.len());

        host.run_frames(3, 16.0);
        assert_eq!(updates.get(), 3);
        assert_eq!(recording.borrow().frames, 3);
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(frame_loop.with_animation(|a| a.frame()), 3);
    }

    #[test]
    fn test_start_is_idempotent() {
        let host = TestHost::default();
        let (mut frame_loop, _) = recorded_loop(&host);
        frame_loop.start().unwrap();
        frame_loop.start().unwrap();
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(host.listener_count(), InputKind::ALL.len());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let host = TestHost::default();
        let (mut frame_loop, recording) = recorded_loop(&host);
        frame_loop.start().unwrap();
        host.run_frames(2, 16.0);

        frame_loop.stop();
        frame_loop.stop();
        assert!(!frame_loop.is_running());
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.listener_count(), 0);

        host.run_frames(2, 16.0);
        assert_eq!(recording.borrow().frames, 2);

        frame_loop.start().unwrap();
        host.run_frames(1, 16.0);
        assert_eq!(recording.borrow().frames, 3);
    }

    #[test]
    fn test_mount_cycles_leave_nothing_behind() {
        let host = TestHost::default();
        for cycle in 0..25 {
            let (mut frame_loop, recording) = recorded_loop(&host);
            frame_loop.start().unwrap();
            host.run_frames(cycle % 3, 16.0);
            if cycle % 2 == 0 {
                frame_loop.stop();
            }
            drop(frame_loop);
            assert!(recording.borrow().dropped);
            assert_eq!(host.pending_frames(), 0);
            assert_eq!(host.listener_count(), 0);
        }
    }

    #[test]
    fn test_pointer_events_reach_tracker_and_decay() {
        let host = TestHost::default();
        let (probe, _, _) = probe();
        let mut frame_loop = FrameLoop::new(host.clone(), Animation::new(probe, None, host.viewport()));
        frame_loop.start().unwrap();

        host.dispatch(InputKind::Mouse, Event::Pointer(PointerEvent::moved(0.0, 0.0)));
        host.dispatch(InputKind::Mouse, Event::Pointer(PointerEvent::moved(6.0, 8.0)));
        assert_eq!(frame_loop.with_animation(|a| a.pointer().speed), 10.0);

        host.run_frames(1, 16.0);
        assert_eq!(frame_loop.with_animation(|a| a.pointer().speed), 5.0);
        let scene_speed = frame_loop.with_animation(|a| match a.scene().commands() {
            [Command::Circle { radius, .. }] => *radius,
            other => panic!("unexpected scene {other:?}"),
        });
        assert_eq!(scene_speed, 10.0);
    }

    #[test]
    fn test_resize_in_both_directions() {
        let host = TestHost::new(Viewport::new(800, 600));
        let (probe, _, resizes) = probe();
        let (surface, recording) = RecordingSurface::new(SurfaceKind::Canvas);
        let mut frame_loop = FrameLoop::new(
            host.clone(),
            Animation::new(probe, Some(Box::new(surface)), host.viewport()),
        );
        frame_loop.start().unwrap();

        host.resize(Viewport::new(1600, 1200));
        host.resize(Viewport::new(320, 240));
        host.run_frames(1, 16.0);

        assert_eq!(
            *resizes.borrow(),
            vec![
                Viewport::new(800, 600),
                Viewport::new(1600, 1200),
                Viewport::new(320, 240)
            ]
        );
        assert_eq!(
            recording.borrow().resizes,
            vec![Viewport::new(1600, 1200), Viewport::new(320, 240)]
        );
        assert_eq!(frame_loop.with_animation(|a| a.scene().viewport()), Viewport::new(320, 240));
    }

    #[test]
    fn test_missing_surface_ticks_without_painting() {
        let host = TestHost::default();
        let (probe, updates, _) = probe();
        let mut frame_loop = FrameLoop::new(host.clone(), Animation::new(probe, None, host.viewport()));
        assert!(!frame_loop.with_animation(|a| a.has_surface()));

        frame_loop.start().unwrap();
        host.run_frames(4, 16.0);
        assert_eq!(updates.get(), 4);
        assert!(frame_loop.is_running());
    }

    #[test]
    fn test_time_and_delta() {
        let (probe, _, _) = probe();
        let mut animation = Animation::new(probe, None, Viewport::new(100, 100));
        animation.tick(1000.0);
        animation.tick(1016.0);
        assert_eq!(animation.start, Some(1000.0));
        assert_eq!(animation.last, Some(1016.0));
        assert_eq!(animation.frame(), 2);
    }
}
