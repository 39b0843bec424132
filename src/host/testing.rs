use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use crate::{
    error::Error,
    event::{Event, InputKind},
    host::{FrameCallback, FrameRequester, Host, InputCallback, TimerCallback},
    scene::Viewport,
};

#[derive(Default)]
struct Registry {
    frames: Vec<Weak<FrameSlot>>,
    listeners: Vec<Weak<ListenerSlot>>,
    timers: Vec<Weak<TimerSlot>>,
}

struct FrameSlot {
    pending: Cell<bool>,
    callback: RefCell<Option<FrameCallback>>,
}

struct ListenerSlot {
    kind: InputKind,
    callback: RefCell<Option<InputCallback>>,
}

struct TimerSlot {
    period_ms: u32,
    callback: RefCell<Option<TimerCallback>>,
}

/// A [`Host`] that records every registration in memory.
///
/// Frames, events and timer periods are delivered by hand with
/// [`fire_frame`](TestHost::fire_frame), [`dispatch`](TestHost::dispatch)
/// and [`advance_timers`](TestHost::advance_timers). Handles are live for
/// as long as their owner keeps them, so the counters report leaks.
#[derive(Clone)]
pub struct TestHost {
    registry: Rc<RefCell<Registry>>,
    viewport: Rc<Cell<Viewport>>,
    clock: Rc<Cell<f64>>,
}

impl std::fmt::Debug for TestHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestHost")
            .field("pending_frames", &self.pending_frames())
            .field("listeners", &self.listener_count())
            .field("timers", &self.timer_count())
            .finish()
    }
}

impl Default for TestHost {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl TestHost {
    /// Constructs a host with the given viewport.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            registry: Rc::default(),
            viewport: Rc::new(Cell::new(viewport)),
            clock: Rc::new(Cell::new(0.0)),
        }
    }

    /// Returns the number of frame requests waiting to fire.
    pub fn pending_frames(&self) -> usize {
        self.registry
            .borrow()
            .frames
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|slot| slot.pending.get())
            .count()
    }

    /// Returns the number of live input listeners.
    pub fn listener_count(&self) -> usize {
        self.live_listeners().len()
    }

    /// Returns the number of live timers.
    pub fn timer_count(&self) -> usize {
        self.live_timers().len()
    }

    fn live_listeners(&self) -> Vec<Rc<ListenerSlot>> {
        let mut registry = self.registry.borrow_mut();
        registry.listeners.retain(|slot| slot.strong_count() > 0);
        registry.listeners.iter().filter_map(Weak::upgrade).collect()
    }

    fn live_timers(&self) -> Vec<Rc<TimerSlot>> {
        let mut registry = self.registry.borrow_mut();
        registry.timers.retain(|slot| slot.strong_count() > 0);
        registry.timers.iter().filter_map(Weak::upgrade).collect()
    }

    /// Fires every pending frame once with the given timestamp.
    ///
    /// Requests made while firing are left pending for the next call.
    /// Returns the number of callbacks run.
    pub fn fire_frame(&self, timestamp: f64) -> usize {
        self.clock.set(timestamp);
        let due: Vec<Rc<FrameSlot>> = {
            let mut registry = self.registry.borrow_mut();
            registry.frames.retain(|slot| slot.strong_count() > 0);
            registry
                .frames
                .iter()
                .filter_map(Weak::upgrade)
                .filter(|slot| slot.pending.get())
                .collect()
        };

        for slot in &due {
            slot.pending.set(false);
            run_taken(&slot.callback, |callback| callback(timestamp));
        }
        due.len()
    }

    /// Fires `count` frames spaced `step_ms` apart, starting after the
    /// current clock.
    pub fn run_frames(&self, count: usize, step_ms: f64) {
        for _ in 0..count {
            self.fire_frame(self.clock.get() + step_ms);
        }
    }

    /// Delivers `event` to every listener of `kind`.
    pub fn dispatch(&self, kind: InputKind, event: Event) {
        for slot in self.live_listeners() {
            if slot.kind == kind {
                run_taken(&slot.callback, |callback| callback(event));
            }
        }
    }

    /// Changes the viewport and dispatches a resize event.
    pub fn resize(&self, viewport: Viewport) {
        self.viewport.set(viewport);
        self.dispatch(InputKind::Resize, Event::Resize(viewport));
    }

    /// Advances the clock by `elapsed_ms` and fires every timer once per
    /// period elapsed.
    pub fn advance_timers(&self, elapsed_ms: u32) {
        self.clock.set(self.clock.get() + elapsed_ms as f64);
        for slot in self.live_timers() {
            let periods = elapsed_ms / slot.period_ms.max(1);
            for _ in 0..periods {
                run_taken(&slot.callback, |callback| callback());
            }
        }
    }
}

/// Runs the stored callback without holding a borrow across the call, so
/// the callback may re-register or drop its own handle.
fn run_taken<F: ?Sized>(cell: &RefCell<Option<Box<F>>>, run: impl FnOnce(&mut Box<F>)) {
    let taken = cell.borrow_mut().take();
    if let Some(mut callback) = taken {
        run(&mut callback);
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(callback);
        }
    }
}

impl Host for TestHost {
    type Frame = TestFrame;
    type Listener = TestListener;
    type Timer = TestTimer;

    fn frame(&self, callback: FrameCallback) -> Result<Self::Frame, Error> {
        let slot = Rc::new(FrameSlot {
            pending: Cell::new(false),
            callback: RefCell::new(Some(callback)),
        });
        self.registry.borrow_mut().frames.push(Rc::downgrade(&slot));
        Ok(TestFrame { slot })
    }

    fn listen(&self, kind: InputKind, callback: InputCallback) -> Result<Self::Listener, Error> {
        let slot = Rc::new(ListenerSlot {
            kind,
            callback: RefCell::new(Some(callback)),
        });
        self.registry.borrow_mut().listeners.push(Rc::downgrade(&slot));
        Ok(TestListener { _slot: slot })
    }

    fn every(&self, period_ms: u32, callback: TimerCallback) -> Result<Self::Timer, Error> {
        let slot = Rc::new(TimerSlot {
            period_ms,
            callback: RefCell::new(Some(callback)),
        });
        self.registry.borrow_mut().timers.push(Rc::downgrade(&slot));
        Ok(TestTimer { _slot: slot })
    }

    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn now(&self) -> f64 {
        self.clock.get()
    }
}

/// Frame handle returned by [`TestHost`].
pub struct TestFrame {
    slot: Rc<FrameSlot>,
}

impl FrameRequester for TestFrame {
    fn request(&mut self) -> Result<(), Error> {
        self.slot.pending.set(true);
        Ok(())
    }

    fn cancel(&mut self) {
        self.slot.pending.set(false);
    }

    fn is_pending(&self) -> bool {
        self.slot.pending.get()
    }
}

impl Drop for TestFrame {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Listener handle returned by [`TestHost`]. Unregisters on drop.
pub struct TestListener {
    _slot: Rc<ListenerSlot>,
}

/// Timer handle returned by [`TestHost`]. Stops on drop.
pub struct TestTimer {
    _slot: Rc<TimerSlot>,
}
