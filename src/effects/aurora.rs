use glam::Vec2;

use crate::{
    backend::color::Rgba,
    effects::{Effect, EffectConfig, FrameContext},
    scene::{Command, Scene, Viewport},
};

const GRID: f32 = 40.0;
const LINES: usize = 6;
const LINE_LENGTH: f32 = 192.0;
/// Segments a data line is split into to fake its vertical gradient.
const LINE_SEGMENTS: usize = 8;

/// One looping glow: keyframes at the start, middle and end of its cycle.
#[derive(Debug, Clone, Copy)]
struct Light {
    period: f32,
    x: [f32; 3],
    y: [f32; 3],
    opacity: [f32; 3],
}

const LIGHTS: [Light; 2] = [
    Light {
        period: 15.0,
        x: [-50.0, 50.0, -50.0],
        y: [-20.0, 30.0, -20.0],
        opacity: [0.03, 0.08, 0.03],
    },
    Light {
        period: 20.0,
        x: [50.0, -50.0, 50.0],
        y: [20.0, -30.0, 20.0],
        opacity: [0.02, 0.06, 0.02],
    },
];

/// Linear interpolation through three evenly spaced keyframes.
fn keyframes(values: [f32; 3], phase: f32) -> f32 {
    let t = phase.rem_euclid(1.0) * 2.0;
    if t < 1.0 {
        values[0] + (values[1] - values[0]) * t
    } else {
        values[1] + (values[2] - values[1]) * (t - 1.0)
    }
}

/// A calm, blurred backdrop: two colored lights drifting in opposite
/// corners, a faint blueprint grid and thin data lines falling down the
/// page.
#[derive(Debug)]
pub struct Aurora {
    config: EffectConfig,
    viewport: Viewport,
}

impl Aurora {
    /// Constructs a new [`Aurora`].
    pub fn new(config: EffectConfig) -> Self {
        Self {
            config,
            viewport: Viewport::default(),
        }
    }

    /// Returns the top of data line `index` (`0..6`) at `time`, or `None`
    /// before its first start.
    pub fn line_top(viewport: Viewport, index: usize, time: f32) -> Option<f32> {
        let i = index as f32 + 1.0;
        let duration = 8.0 + i * 3.0;
        let delay = i * 1.5;
        if time < delay {
            return None;
        }
        let progress = ((time - delay) % duration) / duration;
        Some(-LINE_LENGTH + progress * (viewport.height as f32 + LINE_LENGTH))
    }

    fn lights(&self, time: f32) -> [(Vec2, f32, f32); 2] {
        let size = self.viewport.size();
        let anchors = [
            (Vec2::new(-0.1 * size.x, -0.2 * size.y) + Vec2::splat(0.3 * size.x), 0.3 * size.x),
            (Vec2::new(1.1 * size.x, 1.1 * size.y) - Vec2::splat(0.25 * size.x), 0.25 * size.x),
        ];
        let mut lights = [(Vec2::ZERO, 0.0, 0.0); 2];
        for ((light, (anchor, radius)), out) in LIGHTS.iter().zip(anchors).zip(&mut lights) {
            let phase = time / light.period;
            let offset = Vec2::new(keyframes(light.x, phase), keyframes(light.y, phase));
            *out = (anchor + offset, radius + 90.0, keyframes(light.opacity, phase));
        }
        lights
    }
}

impl Effect for Aurora {
    fn name(&self) -> &'static str {
        "aurora"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn update(&mut self, _context: &FrameContext) {}

    fn draw(&mut self, context: &FrameContext, scene: &mut Scene) {
        let palette = &self.config.palette;
        let size = self.viewport.size();
        scene.fill(palette.background);

        let grid = palette.secondary.alpha(0.03);
        let mut x = 0.0;
        while x < size.x {
            scene.line(Vec2::new(x, 0.0), Vec2::new(x, size.y), 1.0, grid);
            x += GRID;
        }
        let mut y = 0.0;
        while y < size.y {
            scene.line(Vec2::new(0.0, y), Vec2::new(size.x, y), 1.0, grid);
            y += GRID;
        }

        let colors = [palette.primary, palette.secondary];
        for ((center, radius, opacity), color) in self.lights(context.time).into_iter().zip(colors) {
            scene.push(Command::Glow {
                center,
                radius,
                inner: color.alpha(opacity),
                outer: color.alpha(0.0),
            });
        }

        let line: Rgba = palette.accent;
        let segment = LINE_LENGTH / LINE_SEGMENTS as f32;
        for index in 0..LINES {
            let Some(top) = Self::line_top(self.viewport, index, context.time) else {
                continue;
            };
            let x = size.x * (2 * index + 1) as f32 / (2 * LINES) as f32;
            for s in 0..LINE_SEGMENTS {
                let middle = (s as f32 + 0.5) / LINE_SEGMENTS as f32;
                let alpha = (1.0 - (middle * 2.0 - 1.0).abs()) * 0.1;
                let from = top + s as f32 * segment;
                scene.line(Vec2::new(x, from), Vec2::new(x, from + segment), 1.0, line.alpha(alpha));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{effects::test_utils::run, pointer::PointerState};

    #[test]
    fn test_keyframes_loop() {
        let values = [0.03, 0.08, 0.03];
        assert!((keyframes(values, 0.0) - 0.03).abs() < 1e-6);
        assert!((keyframes(values, 0.5) - 0.08).abs() < 1e-6);
        assert!((keyframes(values, 0.25) - 0.055).abs() < 1e-6);
        assert!((keyframes(values, 1.0) - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_lines_start_late_and_loop() {
        let viewport = Viewport::new(800, 600);
        assert_eq!(Aurora::line_top(viewport, 0, 1.0), None);
        assert_eq!(Aurora::line_top(viewport, 0, 1.5), Some(-LINE_LENGTH));
        // first line: 11 s loop after a 1.5 s delay
        let halfway = Aurora::line_top(viewport, 0, 1.5 + 5.5).unwrap();
        assert!((halfway - (-LINE_LENGTH + 0.5 * (600.0 + LINE_LENGTH))).abs() < 1e-3);
        assert_eq!(Aurora::line_top(viewport, 0, 1.5 + 11.0), Some(-LINE_LENGTH));
    }

    #[test]
    fn test_lights_breathe() {
        let mut aurora = Aurora::new(EffectConfig::new());
        aurora.resize(Viewport::new(1000, 800));
        let [(start, _, dim), _] = aurora.lights(0.0);
        let [(middle, radius, bright), _] = aurora.lights(7.5);
        assert!(bright > dim);
        assert!((middle - start - Vec2::new(100.0, 50.0)).length() < 1e-3);
        assert!((radius - 390.0).abs() < 1e-3);
    }

    #[test]
    fn test_scene_before_lines_start() {
        let viewport = Viewport::new(400, 200);
        let mut aurora = Aurora::new(EffectConfig::new());
        aurora.resize(viewport);
        let scene = run(&mut aurora, viewport, &PointerState::default(), 1);
        let glows = scene
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::Glow { .. }))
            .count();
        let lines = scene
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::Line { .. }))
            .count();
        assert_eq!(glows, 2);
        assert_eq!(lines, 10 + 5);
    }
}
