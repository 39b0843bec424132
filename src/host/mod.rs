//! ## Hosts
//!
//! Everything an animation needs from the platform goes through the [`Host`]
//! trait: per-frame scheduling, input listeners, repeating timers and the
//! viewport size.
//!
//! - [`BrowserHost`]: backed by `requestAnimationFrame`, DOM event listeners
//!   and `setInterval` via `web-sys`.
//! - [`testing::TestHost`]: records registrations so lifecycles can be
//!   checked without a browser.
//!
//! Every handle a host returns owns its registration. Dropping a listener
//! detaches it, dropping a timer clears it, dropping a frame cancels it.

/// Browser host.
pub mod browser;

/// Recording host for tests.
pub mod testing;

pub use browser::BrowserHost;

use crate::{
    error::Error,
    event::{Event, InputKind},
    scene::Viewport,
};

/// Callback invoked with the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnMut(f64)>;

/// Callback invoked for every input event of one [`InputKind`].
pub type InputCallback = Box<dyn FnMut(Event)>;

/// Callback invoked on every timer period.
pub type TimerCallback = Box<dyn FnMut()>;

/// A bound per-frame callback that can be scheduled for the next frame.
///
/// At most one request is pending at any time.
pub trait FrameRequester {
    /// Schedules the callback for the next frame. No-op if already pending.
    fn request(&mut self) -> Result<(), Error>;

    /// Cancels the pending request, if any.
    fn cancel(&mut self);

    /// Returns `true` if a request is pending.
    fn is_pending(&self) -> bool;
}

/// The platform an animation runs on.
pub trait Host {
    /// Handle for a bound frame callback. Cancels on drop.
    type Frame: FrameRequester;
    /// Handle for a registered input listener. Detaches on drop.
    type Listener;
    /// Handle for a repeating timer. Clears on drop.
    type Timer;

    /// Binds a per-frame callback without scheduling it.
    fn frame(&self, callback: FrameCallback) -> Result<Self::Frame, Error>;

    /// Registers a listener for every DOM event type of `kind`.
    fn listen(&self, kind: InputKind, callback: InputCallback) -> Result<Self::Listener, Error>;

    /// Calls `callback` every `period_ms` milliseconds.
    fn every(&self, period_ms: u32, callback: TimerCallback) -> Result<Self::Timer, Error>;

    /// Returns the current viewport size.
    fn viewport(&self) -> Viewport;

    /// Returns a monotonic timestamp in milliseconds.
    fn now(&self) -> f64;
}
