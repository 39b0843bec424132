use glam::Vec2;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    effects::{Effect, EffectConfig, FrameContext},
    scene::{Command, Scene, Viewport},
};

/// Largest grain added to a channel, out of 255.
const GRAIN: u8 = 3;
/// Grain is generated at this fraction of the viewport size.
const GRAIN_SCALE: u32 = 2;

/// An almost black page with one faint orb wandering around the center,
/// covered in film grain.
#[derive(Debug)]
pub struct Orbs {
    config: EffectConfig,
    rng: SmallRng,
}

impl Orbs {
    /// Orb radius in pixels.
    pub const RADIUS: f32 = 800.0;
    /// Distance the orb wanders from the center.
    pub const WANDER: f32 = 200.0;

    /// Constructs a new [`Orbs`].
    pub fn new(config: EffectConfig) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Returns the orb center on the given frame.
    pub fn orb_center(viewport: Viewport, frame: u64) -> Vec2 {
        let f = frame as f32;
        viewport.center() + Vec2::new((f * 0.0005).sin(), (f * 0.0003).cos()) * Self::WANDER
    }
}

impl Effect for Orbs {
    fn name(&self) -> &'static str {
        "orbs"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn resize(&mut self, _viewport: Viewport) {}

    fn update(&mut self, _context: &FrameContext) {}

    fn draw(&mut self, context: &FrameContext, scene: &mut Scene) {
        let palette = &self.config.palette;
        scene.fill(palette.background);
        scene.push(Command::Glow {
            center: Self::orb_center(context.viewport, context.frame),
            radius: Self::RADIUS,
            inner: palette.primary.alpha(0.4),
            outer: palette.background.alpha(0.0),
        });

        let width = (context.viewport.width / GRAIN_SCALE).max(1);
        let height = (context.viewport.height / GRAIN_SCALE).max(1);
        let pixels = scene.bitmap_mut(width, height);
        for pixel in pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&[255, 255, 255, self.rng.gen_range(0..=GRAIN)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::color::Rgba, effects::test_utils::run, pointer::PointerState};

    #[test]
    fn test_orb_wanders_around_center() {
        let viewport = Viewport::new(1000, 800);
        assert_eq!(Orbs::orb_center(viewport, 0), Vec2::new(500.0, 600.0));
        for frame in [100, 5_000, 100_000] {
            let center = Orbs::orb_center(viewport, frame);
            assert!(center.distance(viewport.center()) <= Orbs::WANDER * 2f32.sqrt() + 1e-3);
        }
    }

    #[test]
    fn test_draw_fill_orb_and_grain() {
        let viewport = Viewport::new(200, 100);
        let mut orbs = Orbs::new(EffectConfig::new());
        let scene = run(&mut orbs, viewport, &PointerState::default(), 2);

        let commands = scene.commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0],
            Command::Fill {
                color: Rgba::BLACK,
                blend: Default::default(),
            }
        );
        assert!(matches!(commands[1], Command::Glow { radius, .. } if radius == Orbs::RADIUS));
        assert_eq!(commands[2], Command::Bitmap);

        let bitmap = scene.bitmap();
        assert_eq!((bitmap.width(), bitmap.height()), (100, 50));
        assert!(bitmap.pixels().chunks_exact(4).all(|p| p[3] <= GRAIN));
        assert!(bitmap.pixels().chunks_exact(4).any(|p| p[3] > 0));
    }
}
