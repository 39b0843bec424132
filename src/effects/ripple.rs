use glam::Vec2;

use crate::{
    effects::{smoothstep, Effect, EffectConfig, FrameContext},
    scene::{Command, Scene, Viewport},
    sim::HeightField,
};

/// Pointer speeds below this do not disturb the surface.
const MIN_SPEED: f32 = 0.5;

/// Liquid glass ripples.
///
/// A fixed-size [`HeightField`] is disturbed under the moving pointer and
/// stepped once per frame. The heights refract a high-frequency caustic
/// pattern; only crests and troughs are painted, as a translucent overlay
/// stretched over the viewport.
#[derive(Debug)]
pub struct Ripple {
    config: EffectConfig,
    field: HeightField,
    viewport: Viewport,
}

impl Ripple {
    /// Constructs a new [`Ripple`].
    pub fn new(config: EffectConfig) -> Self {
        Self {
            field: HeightField::new(config.grid, config.grid, config.damping),
            config,
            viewport: Viewport::default(),
        }
    }

    /// Returns the height field.
    pub fn field(&self) -> &HeightField {
        &self.field
    }
}

impl Effect for Ripple {
    fn name(&self) -> &'static str {
        "ripple"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.field.reset();
    }

    fn update(&mut self, context: &FrameContext) {
        let pointer = context.pointer;
        if pointer.active && pointer.speed > MIN_SPEED {
            let size = context.viewport.size().max(Vec2::ONE);
            self.field.disturb(
                pointer.position / size,
                self.config.force_radius,
                self.config.force,
                context.viewport.aspect(),
            );
        }
        self.field.step_with_ambient(self.config.ambient, context.time);
    }

    fn draw(&mut self, context: &FrameContext, scene: &mut Scene) {
        let (w, h) = (self.field.width(), self.field.height());
        let tint = self.config.palette.primary.to_vec3();
        let time = context.time;

        scene.push(Command::Clear);
        let heights = self.field.heights();
        let pixels = scene.bitmap_mut(w as u32, h as u32);
        for (i, (pixel, height)) in pixels.chunks_exact_mut(4).zip(heights).enumerate() {
            let u = (i % w) as f32 / w as f32 + height * 0.5;
            let v = (i / w) as f32 / h as f32 + height * 0.5;
            let pattern = (u * 80.0).sin() * (v * 60.0).cos() + (u * 120.0 + time).sin() * 0.5;
            let alpha = smoothstep(0.02, 0.15, (height + pattern * 0.05).abs()) * 0.4;

            pixel[0] = channel(tint[0] + height * 0.2);
            pixel[1] = channel(tint[1]);
            pixel[2] = channel(tint[2] + height * 0.5);
            pixel[3] = channel(alpha);
        }
    }
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        effects::test_utils::{pointer_at, run},
        pointer::PointerState,
    };

    fn config() -> EffectConfig {
        EffectConfig::new().grid(64).force_radius(0.1).force(0.1)
    }

    fn moving(x: f32, y: f32) -> PointerState {
        PointerState {
            speed: 10.0,
            ..pointer_at(x, y)
        }
    }

    #[test]
    fn test_moving_pointer_disturbs() {
        let viewport = Viewport::new(640, 640);
        let mut ripple = Ripple::new(config());
        ripple.resize(viewport);

        run(&mut ripple, viewport, &pointer_at(320.0, 320.0), 1);
        assert_eq!(ripple.field().energy(), 0.0);

        let scene = run(&mut ripple, viewport, &moving(320.0, 320.0), 2);
        assert!(ripple.field().energy() > 0.0);
        assert_eq!(scene.commands(), &[Command::Clear, Command::Bitmap]);
        assert_eq!(scene.bitmap().width(), 64);
        assert_eq!(scene.bitmap().pixels().len(), 64 * 64 * 4);
    }

    #[test]
    fn test_resize_flattens() {
        let viewport = Viewport::new(640, 480);
        let mut ripple = Ripple::new(config());
        run(&mut ripple, viewport, &moving(100.0, 100.0), 3);
        assert!(ripple.field().energy() > 0.0);

        ripple.resize(Viewport::new(320, 240));
        assert_eq!(ripple.field().energy(), 0.0);
        assert_eq!(ripple.field().width(), 64);
    }

    #[test]
    fn test_ambient_keeps_surface_moving() {
        let viewport = Viewport::new(640, 640);
        let mut ripple = Ripple::new(config().ambient(0.005));
        run(&mut ripple, viewport, &PointerState::default(), 10);
        assert!(ripple.field().energy() > 0.0);
    }
}
