use glam::{Mat4, Vec3};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    effects::{Effect, EffectConfig, FrameContext},
    scene::{Scene, Viewport},
    sim::Camera,
};

/// Half extent of the field on the x and y axes, in world units.
const EXTENT: f32 = 25.0;
/// World units fallen per frame.
const FALL: f32 = 0.01;
/// World size of one particle.
const POINT_SIZE: f32 = 0.05;
/// Linear fog range along the view direction.
const FOG: (f32, f32) = (5.0, 25.0);
const CAMERA: Camera = Camera::new(Vec3::new(0.0, 0.0, 15.0), 60.0);

/// A slow snowfall of particles in a dark, fogged volume.
///
/// The field lives in world space, so resizing only changes the
/// projection. The whole volume sways gently around the vertical axis.
#[derive(Debug)]
pub struct Drift {
    config: EffectConfig,
    points: Vec<Vec3>,
    viewport: Viewport,
}

impl Drift {
    /// Constructs a new [`Drift`] with `config.particle_count` particles.
    pub fn new(config: EffectConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let points = (0..config.particle_count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-EXTENT..EXTENT),
                    rng.gen_range(-EXTENT..EXTENT),
                    rng.gen_range(-20.0..0.0),
                )
            })
            .collect();
        Self {
            config,
            points,
            viewport: Viewport::default(),
        }
    }

    /// Returns the particle positions in world units.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

impl Effect for Drift {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn update(&mut self, _context: &FrameContext) {
        for point in &mut self.points {
            point.y -= FALL;
            if point.y < -EXTENT {
                point.y = EXTENT;
            }
        }
    }

    fn draw(&mut self, context: &FrameContext, scene: &mut Scene) {
        let viewport = context.viewport;
        let palette = &self.config.palette;
        scene.fill(palette.background);

        let sway = Mat4::from_rotation_y((context.time * 0.05).sin() * 0.1);
        let matrix = CAMERA.view_projection(viewport) * sway;
        for point in &self.points {
            let Some(projected) = CAMERA.project(&matrix, *point, viewport) else {
                continue;
            };
            let fog = ((projected.depth - FOG.0) / (FOG.1 - FOG.0)).clamp(0.0, 1.0);
            let alpha = 0.4 * (1.0 - fog);
            if alpha <= 0.0 {
                continue;
            }
            let radius = (POINT_SIZE * projected.scale * 0.5).max(0.5);
            scene.circle(projected.position, radius, palette.primary.alpha(alpha));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{effects::test_utils::run, pointer::PointerState, scene::Command};

    fn config() -> EffectConfig {
        EffectConfig::new().particle_count(500).seed(11)
    }

    #[test]
    fn test_particles_fall_and_wrap() {
        let mut effect = Drift::new(config());
        let index = effect
            .points()
            .iter()
            .position(|p| p.y > 0.0)
            .unwrap();
        let before = effect.points()[index];
        run(&mut effect, Viewport::new(800, 600), &PointerState::default(), 10);
        let after = effect.points()[index];
        assert!((before.y - after.y - 10.0 * FALL).abs() < 1e-4);
        assert_eq!(before.x, after.x);

        let frames = (2.0 * EXTENT / FALL) as u64 + 10;
        run(&mut effect, Viewport::new(800, 600), &PointerState::default(), frames);
        assert!(effect
            .points()
            .iter()
            .all(|p| (-EXTENT..=EXTENT).contains(&p.y)));
    }

    #[test]
    fn test_draws_background_then_visible_particles() {
        let viewport = Viewport::new(800, 600);
        let mut effect = Drift::new(config());
        effect.resize(viewport);
        let scene = run(&mut effect, viewport, &PointerState::default(), 1);

        assert!(matches!(scene.commands()[0], Command::Fill { .. }));
        let circles = scene.commands().len() - 1;
        assert!(circles > 0 && circles <= 500);
        assert!(scene.commands()[1..].iter().all(|c| match c {
            Command::Circle { center, color, .. } =>
                color.a <= 0.4 && (0.0..=800.0).contains(&center.x),
            _ => false,
        }));
    }
}
