use std::f32::consts::TAU;

use glam::{Mat4, Vec2, Vec3};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    effects::{Effect, EffectConfig, FrameContext},
    scene::{Scene, Viewport},
    sim::Camera,
};

const ARMS: usize = 3;
const MAX_RADIUS: f32 = 8.0;
const SPIN: f32 = 5.0;
const OPACITY: f32 = 0.8;
const CAMERA: Camera = Camera::new(Vec3::new(0.0, 6.0, 10.0), 45.0);

#[derive(Debug, Clone, Copy)]
struct Star {
    position: Vec3,
    color: [f32; 3],
}

/// A slowly rotating three-arm spiral galaxy.
///
/// Stars are hot near the core and cool along the arms. The disc spins
/// around its axis and tilts towards the pointer. Stars are accumulated
/// additively into a half-resolution bitmap.
#[derive(Debug)]
pub struct Galaxy {
    config: EffectConfig,
    stars: Vec<Star>,
    viewport: Viewport,
}

impl Galaxy {
    /// Constructs a new [`Galaxy`] with `config.particle_count` stars.
    ///
    /// The core takes the palette's primary color and the arms its secondary.
    pub fn new(config: EffectConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let (inside, outside) = (config.palette.primary, config.palette.secondary);
        let stars = (0..config.particle_count)
            .map(|i| {
                let radius = rng.gen_range(0.0..MAX_RADIUS);
                let branch = (i % ARMS) as f32 / ARMS as f32 * TAU;
                let angle = branch + radius * SPIN;
                let mut scatter = || {
                    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                    rng.gen::<f32>().powi(3) * sign * 0.5 * radius
                };
                let offset = Vec3::new(scatter(), scatter() * 0.5, scatter());
                Star {
                    position: Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius) + offset,
                    color: inside.lerp(outside, radius / MAX_RADIUS).to_vec3(),
                }
            })
            .collect();
        Self {
            config,
            stars,
            viewport: Viewport::default(),
        }
    }

    /// Returns the number of stars.
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    /// Returns `true` if there are no stars.
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Returns the galaxy's model matrix at `time` for a pointer at `ndc`
    /// (`-1.0..=1.0`, y up).
    fn model(time: f32, ndc: Vec2, viewport: Viewport) -> Mat4 {
        let distance = CAMERA.position.length();
        let world_height = 2.0 * (CAMERA.fov.to_radians() / 2.0).tan() * distance;
        let world = Vec2::new(world_height * viewport.aspect(), world_height);
        let tilt = ndc * world / 5.0;
        Mat4::from_rotation_x(tilt.y * 0.05 + 0.5)
            * Mat4::from_rotation_y(time * 0.05)
            * Mat4::from_rotation_z(tilt.x * 0.05)
    }
}

impl Effect for Galaxy {
    fn name(&self) -> &'static str {
        "galaxy"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn update(&mut self, _context: &FrameContext) {}

    fn draw(&mut self, context: &FrameContext, scene: &mut Scene) {
        let target = Viewport::new(
            (context.viewport.width / 2).max(1),
            (context.viewport.height / 2).max(1),
        );
        let pointer = context.pointer;
        let ndc = if pointer.active {
            let size = context.viewport.size().max(Vec2::ONE);
            Vec2::new(
                pointer.position.x / size.x * 2.0 - 1.0,
                1.0 - pointer.position.y / size.y * 2.0,
            )
        } else {
            Vec2::ZERO
        };
        let matrix =
            CAMERA.view_projection(target) * Self::model(context.time, ndc, context.viewport);

        let background = self.config.palette.background;
        let pixels = scene.bitmap_mut(target.width, target.height);
        for pixel in pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&[background.r, background.g, background.b, 255]);
        }

        for star in &self.stars {
            let Some(projected) = CAMERA.project(&matrix, star.position, target) else {
                continue;
            };
            let x = (projected.position.x as u32).min(target.width - 1);
            let y = (projected.position.y as u32).min(target.height - 1);
            let i = (y * target.width + x) as usize * 4;
            for (channel, value) in pixels[i..i + 3].iter_mut().zip(star.color) {
                *channel = channel.saturating_add((value * OPACITY * 255.0) as u8);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::color::Rgba,
        effects::{
            test_utils::{pointer_at, run},
            Palette,
        },
        pointer::PointerState,
        scene::Command,
    };

    fn config() -> EffectConfig {
        EffectConfig::new().particle_count(3000).palette(Palette {
            background: Rgba::hex(0x030305),
            primary: Rgba::hex(0xff6030),
            secondary: Rgba::hex(0x1b3984),
            accent: Rgba::hex(0xff6030),
        })
    }

    fn brightness(pixels: &[u8]) -> u64 {
        pixels.iter().map(|c| *c as u64).sum()
    }

    #[test]
    fn test_stars_form_a_flattened_disc() {
        let galaxy = Galaxy::new(config());
        assert_eq!(galaxy.len(), 3000);
        assert!(galaxy
            .stars
            .iter()
            .all(|s| s.position.y.abs() <= MAX_RADIUS * 0.25 + 1e-4));
        let mean_height: f32 =
            galaxy.stars.iter().map(|s| s.position.y.abs()).sum::<f32>() / 3000.0;
        assert!(mean_height < 0.5);
    }

    #[test]
    fn test_draws_half_resolution_bitmap_with_bright_core() {
        let viewport = Viewport::new(400, 300);
        let mut galaxy = Galaxy::new(config());
        galaxy.resize(viewport);
        let scene = run(&mut galaxy, viewport, &PointerState::default(), 1);

        assert_eq!(scene.commands(), &[Command::Bitmap]);
        let bitmap = scene.bitmap();
        assert_eq!((bitmap.width(), bitmap.height()), (200, 150));

        let pixels = bitmap.pixels();
        let row = |y: u32, x0: u32, x1: u32| {
            let start = ((y * 200 + x0) * 4) as usize;
            let end = ((y * 200 + x1) * 4) as usize;
            &pixels[start..end]
        };
        let core: u64 = (65..85).map(|y| brightness(row(y, 90, 110))).sum();
        let corner: u64 = (0..20).map(|y| brightness(row(y, 0, 20))).sum();
        assert!(core > corner);
        assert!(pixels
            .chunks_exact(4)
            .all(|p| p[0] >= 3 && p[1] >= 3 && p[2] >= 5 && p[3] == 255));
    }

    #[test]
    fn test_pointer_tilts_the_disc() {
        let viewport = Viewport::new(400, 300);
        let mut centered = Galaxy::new(config());
        let mut tilted = Galaxy::new(config());
        let a = run(&mut centered, viewport, &PointerState::default(), 1);
        let b = run(&mut tilted, viewport, &pointer_at(400.0, 0.0), 1);
        assert_ne!(a.bitmap().pixels(), b.bitmap().pixels());
    }
}
