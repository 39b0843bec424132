use std::f32::consts::TAU;

use crate::{
    backend::color::Rgba,
    effects::{Effect, EffectConfig, FrameContext},
    scene::{Scene, Viewport},
    sim::ParticleField,
};

const SPACING: f32 = 60.0;
const JITTER: f32 = 20.0;
const FILL: f64 = 0.7;
const WANDER: f32 = 0.05;
const SPRING: f32 = 0.01;
const FRICTION: f32 = 0.92;
const SWIRL: f32 = 0.1;
const LINK_DISTANCE: f32 = 120.0;

/// A living network of particles.
///
/// Particles rest on a jittered grid, wander, get pushed and swirled by
/// the pointer and spring back. Close pairs are linked with lines that
/// fade with distance, over a translucent fill that leaves short trails.
#[derive(Debug)]
pub struct Constellation {
    config: EffectConfig,
    field: ParticleField,
}

impl Constellation {
    /// Constructs a new [`Constellation`]. Particles are seeded on resize.
    pub fn new(config: EffectConfig) -> Self {
        Self {
            field: ParticleField::new(config.seed),
            config,
        }
    }

    /// Returns the particle field.
    pub fn field(&self) -> &ParticleField {
        &self.field
    }
}

impl Effect for Constellation {
    fn name(&self) -> &'static str {
        "constellation"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn resize(&mut self, viewport: Viewport) {
        self.field
            .seed_grid(viewport, SPACING, JITTER, FILL, self.config.particle_count);
    }

    fn update(&mut self, context: &FrameContext) {
        let pointer = context.pointer;
        if pointer.active {
            self.field.repel(
                pointer.position,
                pointer.velocity,
                self.config.force_radius,
                self.config.force,
                SWIRL,
            );
        }
        self.field.wander(WANDER);
        self.field.spring(SPRING);
        self.field.damp(FRICTION);
        self.field.integrate();
    }

    fn draw(&mut self, context: &FrameContext, scene: &mut Scene) {
        let palette = &self.config.palette;
        scene.fill(palette.background.alpha(0.1));

        let link = palette.accent;
        self.field.for_each_link(LINK_DISTANCE, |a, b, distance| {
            let opacity = 1.0 - distance / LINK_DISTANCE;
            scene.line(a.position, b.position, 1.0, link.alpha(opacity * 0.2));
        });

        for p in self.field.particles() {
            let hue = 180.0 + p.phase / TAU * 40.0;
            scene.circle(p.position, p.size, Rgba::hsl(hue, 100.0, 70.0).alpha(0.8));
        }

        if context.pointer.active {
            scene.glow(
                context.pointer.position,
                self.config.force_radius,
                link.alpha(0.15),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        effects::test_utils::{pointer_at, run},
        pointer::PointerState,
        scene::Command,
    };

    fn config() -> EffectConfig {
        EffectConfig::new()
            .particle_count(200)
            .force_radius(150.0)
            .force(0.5)
    }

    #[test]
    fn test_resize_reseeds() {
        let mut effect = Constellation::new(config());
        effect.resize(Viewport::new(1200, 600));
        assert!(effect.field().len() >= 200);

        effect.resize(Viewport::new(120, 120));
        assert_eq!(effect.field().len(), 200);
    }

    #[test]
    fn test_pointer_pushes_particles_away() {
        let viewport = Viewport::new(600, 600);
        let mut calm = Constellation::new(config());
        let mut pushed = Constellation::new(config());
        calm.resize(viewport);
        pushed.resize(viewport);

        let center = viewport.center();
        let mean_distance = |effect: &Constellation| {
            let distances: Vec<f32> = effect
                .field()
                .particles()
                .iter()
                .filter(|p| p.anchor.distance(center) < 100.0)
                .map(|p| p.position.distance(center))
                .collect();
            distances.iter().sum::<f32>() / distances.len().max(1) as f32
        };

        run(&mut calm, viewport, &PointerState::default(), 10);
        run(&mut pushed, viewport, &pointer_at(center.x, center.y), 10);
        assert!(mean_distance(&pushed) > mean_distance(&calm));
    }

    #[test]
    fn test_draw_links_and_glow() {
        let viewport = Viewport::new(600, 600);
        let mut effect = Constellation::new(config());
        effect.resize(viewport);
        let scene = run(&mut effect, viewport, &pointer_at(300.0, 300.0), 1);

        let commands = scene.commands();
        assert!(matches!(commands[0], Command::Fill { .. }));
        assert!(commands.iter().any(|c| matches!(c, Command::Line { .. })));
        assert!(matches!(commands.last(), Some(Command::Glow { .. })));
    }
}
