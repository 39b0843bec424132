//! ## vitrine
//!
//! Pointer-reactive animated backgrounds for the web, built with Rust and
//! WebAssembly.
//!
//! A [`Stage`] mounts one [`Theme`] at a time. Each theme mounts one or more
//! [`Effect`]s, and every effect runs in its own [`FrameLoop`]: the loop
//! tracks the pointer, steps the effect's simulation once per frame and
//! replays the recorded [`Scene`] onto a [`Surface`](backend::Surface).
//!
//! ```no_run
//! use vitrine::{backend::BrowserSurfaces, BrowserHost, LocalStorage, Stage};
//!
//! # fn main() -> Result<(), vitrine::error::Error> {
//! let mut stage = Stage::new(BrowserHost::new()?, LocalStorage::new()?, BrowserSurfaces::new());
//! stage.restore()?;
//! # Ok(())
//! # }
//! ```
//!
//! Everything platform-specific sits behind the [`Host`] and
//! [`SurfaceFactory`](backend::SurfaceFactory) seams, so the simulations,
//! the loop lifecycle and the theme registry run unmodified in native tests
//! with [`host::testing::TestHost`] and
//! [`backend::recording::RecordingSurfaces`].

/// Surfaces that paint recorded scenes.
pub mod backend;

/// Resume download with fallback.
pub mod download;

/// Backgrounds and their parameters.
pub mod effects;

/// Error type.
pub mod error;

/// Input events.
pub mod event;

/// Platform seam.
pub mod host;

/// Visit memory.
pub mod memory;

/// Pointer tracking.
pub mod pointer;

/// Frame loop.
pub mod render;

/// Display lists.
pub mod scene;

/// Simulation state.
pub mod sim;

/// Theme mounting.
pub mod stage;

/// Persistence.
pub mod storage;

/// Theme registry.
pub mod theme;

/// Utility functions.
pub mod utils;

pub use effects::{Effect, EffectConfig, Palette};
pub use host::{BrowserHost, Host};
pub use render::{Animation, FrameLoop};
pub use scene::{Scene, Viewport};
pub use stage::Stage;
pub use storage::{KeyValueStore, LocalStorage, MemoryStore};
pub use theme::Theme;
