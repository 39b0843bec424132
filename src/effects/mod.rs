//! ## Effects
//!
//! Every background is one [`Effect`]: it owns its simulation state, reacts
//! to the pointer, advances one discrete step per frame and records what it
//! wants drawn into a [`Scene`]. Effects are parameterized by an
//! [`EffectConfig`] so the same engine serves several themes.
//!
//! | Effect            | Simulation                          | Surface     |
//! |-------------------|-------------------------------------|-------------|
//! | [`Ripple`]        | 512×512 damped height field         | canvas      |
//! | [`Warp`]          | turbulence displacement scale       | svg filter  |
//! | [`Constellation`] | anchored particles with links       | canvas      |
//! | [`Tension`]       | tension-driven orbiting particles   | canvas      |
//! | [`Ink`]           | expiring ink droplets               | canvas      |
//! | [`Drift`]         | falling particle field              | canvas      |
//! | [`Galaxy`]        | rotating three-arm star spiral      | canvas      |
//! | [`ShaderField`]   | smoothed uniforms for a shader      | webgl2      |
//! | [`Orbs`]          | slow gradient orb and grain         | canvas      |
//! | [`Ticker`]        | data streams and live charts        | canvas      |
//! | [`Aurora`]        | drifting glows and data lines       | canvas      |

mod aurora;
mod constellation;
mod drift;
mod galaxy;
mod ink;
mod orbs;
mod ripple;
mod shader_field;
mod tension;
mod ticker;
mod warp;

pub use aurora::Aurora;
pub use constellation::Constellation;
pub use drift::Drift;
pub use galaxy::Galaxy;
pub use ink::{Droplet, Ink};
pub use orbs::Orbs;
pub use ripple::Ripple;
pub use shader_field::{ShaderField, ShaderProgram, Smoothing};
pub use tension::Tension;
pub use ticker::Ticker;
pub use warp::Warp;

use crate::{
    backend::{color::Rgba, SurfaceKind},
    event::PointerEvent,
    pointer::PointerState,
    scene::{Scene, Viewport},
};

/// Colors an effect draws with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Page background behind the surface.
    pub background: Rgba,
    /// Main drawing color.
    pub primary: Rgba,
    /// Secondary drawing color.
    pub secondary: Rgba,
    /// Highlight color.
    pub accent: Rgba,
}

impl Palette {
    /// White-on-black fallback palette.
    pub const MONO: Palette = Palette {
        background: Rgba::BLACK,
        primary: Rgba::WHITE,
        secondary: Rgba::rgb(128, 128, 128),
        accent: Rgba::WHITE,
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::MONO
    }
}

/// Parameters shared by all effects.
///
/// Not every effect reads every field. Per-theme tables live in
/// [`theme`](crate::theme); the builder methods tweak a copy at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectConfig {
    /// Colors.
    pub palette: Palette,
    /// Multiplier applied to simulation state every step.
    pub damping: f32,
    /// Per-tick decay of the pointer speed.
    pub speed_decay: f32,
    /// Number of particles, or the density divisor for density-based pools.
    pub particle_count: usize,
    /// Radius of pointer influence (pixels, or normalized for grids).
    pub force_radius: f32,
    /// Strength of pointer influence.
    pub force: f32,
    /// Amplitude of the self-driven motion when no pointer is present.
    pub ambient: f32,
    /// Constant speed reported for touch moves instead of the measured delta.
    pub touch_speed: Option<f32>,
    /// Side of the square simulation grid, in cells.
    pub grid: usize,
    /// Seed for the effect's random source.
    pub seed: u64,
}

impl EffectConfig {
    /// Neutral defaults.
    pub const DEFAULT: EffectConfig = EffectConfig {
        palette: Palette::MONO,
        damping: 0.96,
        speed_decay: 0.95,
        particle_count: 200,
        force_radius: 150.0,
        force: 0.5,
        ambient: 0.0,
        touch_speed: None,
        grid: 512,
        seed: 0x5eed,
    };

    /// Constructs a new [`EffectConfig`] with the defaults.
    pub fn new() -> Self {
        Self::DEFAULT
    }

    /// Sets the palette.
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Sets the damping multiplier.
    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Sets the per-tick pointer speed decay.
    pub fn speed_decay(mut self, decay: f32) -> Self {
        self.speed_decay = decay;
        self
    }

    /// Sets the particle count.
    pub fn particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Sets the radius of pointer influence.
    pub fn force_radius(mut self, radius: f32) -> Self {
        self.force_radius = radius;
        self
    }

    /// Sets the strength of pointer influence.
    pub fn force(mut self, force: f32) -> Self {
        self.force = force;
        self
    }

    /// Sets the ambient amplitude.
    pub fn ambient(mut self, ambient: f32) -> Self {
        self.ambient = ambient;
        self
    }

    /// Sets the constant touch speed.
    pub fn touch_speed(mut self, speed: Option<f32>) -> Self {
        self.touch_speed = speed;
        self
    }

    /// Sets the simulation grid size.
    pub fn grid(mut self, grid: usize) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-frame inputs handed to [`Effect::update`] and [`Effect::draw`].
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Seconds since the animation started.
    pub time: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Number of frames ticked before this one.
    pub frame: u64,
    /// Current viewport.
    pub viewport: Viewport,
    /// Pointer state after this frame's input.
    pub pointer: &'a PointerState,
}

/// A pointer-reactive background.
pub trait Effect {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the configuration the effect was built with.
    fn config(&self) -> &EffectConfig;

    /// The surface this effect draws on.
    fn surface(&self) -> SurfaceKind {
        SurfaceKind::Canvas
    }

    /// Fragment shader source for [`SurfaceKind::WebGl2`] effects.
    fn fragment_shader(&self) -> Option<&'static str> {
        None
    }

    /// Reallocates and resets simulation state for the new viewport.
    fn resize(&mut self, viewport: Viewport);

    /// Reacts to one pointer event. `pointer` already includes it.
    fn on_pointer(&mut self, _event: &PointerEvent, _pointer: &PointerState) {}

    /// Advances the simulation by one step.
    fn update(&mut self, context: &FrameContext);

    /// Records the current state.
    fn draw(&mut self, context: &FrameContext, scene: &mut Scene);
}

/// Smooth Hermite interpolation between `edge0` and `edge1`.
pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use crate::pointer::PointerState;

    /// Runs `frames` update/draw cycles at 60 fps and returns the last scene.
    pub fn run(effect: &mut dyn Effect, viewport: Viewport, pointer: &PointerState, frames: u64) -> Scene {
        let mut scene = Scene::new(viewport);
        for frame in 0..frames {
            let context = FrameContext {
                time: frame as f32 / 60.0,
                delta: 1.0 / 60.0,
                frame,
                viewport,
                pointer,
            };
            effect.update(&context);
            scene.reset(viewport);
            effect.draw(&context, &mut scene);
        }
        scene
    }

    /// An active, resting pointer at `(x, y)`.
    pub fn pointer_at(x: f32, y: f32) -> PointerState {
        PointerState {
            position: glam::Vec2::new(x, y),
            active: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = EffectConfig::new()
            .damping(0.9)
            .touch_speed(Some(15.0))
            .grid(64)
            .seed(3);
        assert_eq!(config.damping, 0.9);
        assert_eq!(config.touch_speed, Some(15.0));
        assert_eq!(config.grid, 64);
        assert_eq!(config.seed, 3);
        assert_eq!(config.speed_decay, EffectConfig::DEFAULT.speed_decay);
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.02, 0.15, 0.0), 0.0);
        assert_eq!(smoothstep(0.02, 0.15, 1.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
