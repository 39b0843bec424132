use glam::Vec2;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    effects::{Effect, EffectConfig, FrameContext},
    event::{PointerEvent, PointerEventKind},
    pointer::PointerState,
    scene::{Blend, Command, Scene, Viewport},
};

/// A drop of ink bleeding into the paper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Droplet {
    /// Center in pixels.
    pub position: Vec2,
    /// Drift per frame.
    pub velocity: Vec2,
    /// Radius in pixels; grows every frame.
    pub radius: f32,
    /// Opacity; fades every frame.
    pub alpha: f32,
    /// Frames lived.
    pub life: u32,
    /// Frames before the droplet is dropped.
    pub max_life: u32,
}

impl Droplet {
    /// Advances the droplet one frame. Returns `false` once it has expired.
    pub fn step(&mut self) -> bool {
        self.position += self.velocity;
        self.radius += 0.05;
        self.alpha *= 0.98;
        self.life += 1;
        self.life < self.max_life
    }
}

/// Ink on paper.
///
/// Pointer moves leave a faint trail of droplets, presses splash a bigger
/// blot and dragging interpolates a continuous stroke. Droplets spread and
/// fade until they expire, and the persistent ink layer is slowly erased.
#[derive(Debug)]
pub struct Ink {
    config: EffectConfig,
    rng: SmallRng,
    droplets: Vec<Droplet>,
    last: Option<Vec2>,
    drawing: bool,
}

impl Ink {
    /// Fraction of the ink layer erased per frame.
    pub const FADE: f32 = 0.01;

    /// Constructs a new [`Ink`].
    pub fn new(config: EffectConfig) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            droplets: Vec::new(),
            last: None,
            drawing: false,
        }
    }

    /// Returns the live droplets.
    pub fn droplets(&self) -> &[Droplet] {
        &self.droplets
    }

    fn splash(&mut self, at: Vec2, stroke: bool) {
        let (count, spread, size) = if stroke { (2, 10.0, 4.0) } else { (10, 30.0, 8.0) };
        for _ in 0..count {
            let rng = &mut self.rng;
            let droplet = Droplet {
                position: at
                    + Vec2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5)) * spread,
                velocity: Vec2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5)),
                radius: rng.gen_range(1.0..1.0 + size),
                alpha: rng.gen_range(0.1..0.5),
                life: 0,
                max_life: rng.gen_range(50..150),
            };
            self.droplets.push(droplet);
        }
    }
}

impl Effect for Ink {
    fn name(&self) -> &'static str {
        "ink"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn resize(&mut self, _viewport: Viewport) {
        self.droplets.clear();
        self.last = None;
    }

    fn on_pointer(&mut self, event: &PointerEvent, _pointer: &PointerState) {
        let at = event.position();
        match event.kind {
            PointerEventKind::Pressed => {
                self.drawing = true;
                self.splash(at, false);
            }
            PointerEventKind::Released | PointerEventKind::Left => self.drawing = false,
            PointerEventKind::Moved => {
                let from = self.last.unwrap_or(at);
                let distance = from.distance(at);
                if self.drawing && distance > 5.0 {
                    let steps = ((distance / 5.0) as usize).min(20);
                    for i in 0..steps {
                        self.splash(from.lerp(at, i as f32 / steps as f32), true);
                    }
                } else if !self.drawing {
                    self.splash(at, true);
                }
            }
            PointerEventKind::Unidentified => {}
        }
        self.last = Some(at);
    }

    fn update(&mut self, _context: &FrameContext) {
        self.droplets.retain_mut(Droplet::step);
    }

    fn draw(&mut self, _context: &FrameContext, scene: &mut Scene) {
        scene.push(Command::Fill {
            color: self.config.palette.background.alpha(Self::FADE),
            blend: Blend::Erase,
        });

        let ink = self.config.palette.primary;
        for droplet in &self.droplets {
            scene.circle(droplet.position, droplet.radius, ink.alpha(droplet.alpha));
        }
    }
}
