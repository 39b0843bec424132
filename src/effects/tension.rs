use glam::Vec2;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    backend::color::Rgba,
    effects::{Effect, EffectConfig, FrameContext},
    event::{PointerEvent, PointerEventKind},
    pointer::PointerState,
    scene::{Scene, Viewport},
    sim::wrap_point,
};

/// Pointer speed above which movement raises the tension.
const AGITATION_SPEED: f32 = 5.0;
/// Squared distance under which particles are linked.
const LINK_DISTANCE_SQ: f32 = 5000.0;

#[derive(Debug, Clone, Copy)]
struct Mote {
    position: Vec2,
    anchor: Vec2,
    base_size: f32,
    size: f32,
    angle: f32,
    spin: f32,
}

/// A field that tenses up under fast pointer movement.
///
/// Fast moves raise a target tension which relaxes linearly every frame;
/// the applied tension eases after it. Tension speeds up the particles'
/// orbits, widens the pointer's reach, lifts the whole field upwards and,
/// past `0.3`, links neighbouring particles.
#[derive(Debug)]
pub struct Tension {
    config: EffectConfig,
    rng: SmallRng,
    motes: Vec<Mote>,
    viewport: Viewport,
    tension: f32,
    target: f32,
}

impl Tension {
    /// Resting tension.
    pub const REST: f32 = 0.1;

    /// Constructs a new [`Tension`]. Particles are seeded on resize.
    pub fn new(config: EffectConfig) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            motes: Vec::new(),
            viewport: Viewport::default(),
            tension: Self::REST,
            target: Self::REST,
        }
    }

    /// Returns the applied tension in `0.0..=1.0`.
    pub fn tension(&self) -> f32 {
        self.tension
    }

    /// Returns the number of particles.
    pub fn len(&self) -> usize {
        self.motes.len()
    }

    /// Returns `true` if there are no particles.
    pub fn is_empty(&self) -> bool {
        self.motes.is_empty()
    }

    fn reach(&self) -> f32 {
        self.config.force_radius + self.tension * 100.0
    }
}

impl Effect for Tension {
    fn name(&self) -> &'static str {
        "tension"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let count = (viewport.area() / self.config.particle_count.max(1) as u64) as usize;
        let rng = &mut self.rng;
        self.motes = (0..count)
            .map(|_| {
                let position = Vec2::new(
                    rng.gen_range(0.0..=viewport.width as f32),
                    rng.gen_range(0.0..=viewport.height as f32),
                );
                let size = rng.gen_range(0.5..2.5);
                Mote {
                    position,
                    anchor: position,
                    base_size: size,
                    size,
                    angle: rng.gen_range(0.0..std::f32::consts::TAU),
                    spin: rng.gen_range(0.1..0.3),
                }
            })
            .collect();
    }

    fn on_pointer(&mut self, event: &PointerEvent, pointer: &PointerState) {
        if event.kind == PointerEventKind::Moved && pointer.speed > AGITATION_SPEED {
            self.target = (self.target + pointer.speed * 0.005).min(1.0);
        }
    }

    fn update(&mut self, context: &FrameContext) {
        self.target = (self.target - 0.005).max(0.0);
        self.tension += (self.target - self.tension) * 0.1;

        let tension = self.tension;
        let reach = self.reach();
        let pointer = context.pointer;
        let push = pointer.speed * 0.1 + 1.0;
        let size = self.viewport.size();

        for mote in &mut self.motes {
            mote.angle += mote.spin * (0.5 + tension * 2.0);
            mote.position += Vec2::from_angle(mote.angle) * (0.5 + tension);

            let delta = pointer.position - mote.position;
            let distance = delta.length();
            if pointer.active && distance < reach && distance > f32::EPSILON {
                let force = (reach - distance) / reach;
                mote.position -= delta / distance * force * push;
                mote.size = mote.base_size + force * 2.0 * (1.0 + tension * 2.0);
            } else {
                mote.size = mote.base_size;
                mote.position += (mote.anchor - mote.position) * 0.01;
            }

            mote.position.y -= tension * 2.0;
            mote.position = wrap_point(mote.position, size);
        }
    }

    fn draw(&mut self, context: &FrameContext, scene: &mut Scene) {
        let tension = self.tension;
        let background = self.config.palette.background;
        scene.fill(background.alpha(0.1 + (1.0 - tension) * 0.1));

        if tension > 0.3 {
            let link = self.config.palette.secondary;
            for (i, a) in self.motes.iter().enumerate() {
                for b in &self.motes[i + 1..] {
                    let distance_sq = a.position.distance_squared(b.position);
                    if distance_sq < LINK_DISTANCE_SQ {
                        let alpha = (1.0 - distance_sq / LINK_DISTANCE_SQ) * tension * 0.5;
                        scene.line(a.position, b.position, 0.5, link.alpha(alpha));
                    }
                }
            }
        }

        let pointer = context.pointer;
        let calm = self.config.palette.primary;
        for mote in &self.motes {
            let glow = if pointer.active {
                (1.0 - mote.position.distance(pointer.position) / 200.0).max(0.0)
            } else {
                0.0
            };
            let alpha = (0.1 + glow * 0.5 + tension * 0.3).min(1.0);
            scene.circle(mote.position, mote.size, calm.lerp(Rgba::WHITE, tension).alpha(alpha));
        }

        if pointer.active {
            scene.glow(
                pointer.position,
                400.0 + tension * 400.0,
                self.config.palette.accent.alpha(tension * 0.1),
            );
        }
    }
}
