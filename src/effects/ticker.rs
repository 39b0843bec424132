use std::collections::VecDeque;

use glam::Vec2;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    backend::color::Rgba,
    effects::{Effect, EffectConfig, FrameContext},
    scene::{Command, Scene, Viewport},
};

const STREAMS: usize = 30;
const CHART_POINTS: usize = 100;
const CHART_EVERY: u64 = 5;
const GRID: f32 = 40.0;
const FONT_SIZE: f32 = 10.0;

#[derive(Debug, Clone)]
struct Stream {
    position: Vec2,
    speed: f32,
    text: String,
}

/// A trading-floor backdrop: a scrolling grid, falling hex data streams and
/// two live line charts along the bottom third.
#[derive(Debug)]
pub struct Ticker {
    config: EffectConfig,
    rng: SmallRng,
    streams: Vec<Stream>,
    primary: VecDeque<f32>,
    secondary: VecDeque<f32>,
    viewport: Viewport,
    frame: u64,
}

impl Ticker {
    /// Constructs a new [`Ticker`]. Streams are placed on resize.
    pub fn new(config: EffectConfig) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            streams: Vec::new(),
            primary: VecDeque::from(vec![50.0; CHART_POINTS]),
            secondary: VecDeque::from(vec![20.0; CHART_POINTS]),
            viewport: Viewport::default(),
            frame: 0,
        }
    }

    /// Returns the two chart series, oldest sample first, in `0.0..=100.0`.
    pub fn series(&self) -> (&VecDeque<f32>, &VecDeque<f32>) {
        (&self.primary, &self.secondary)
    }

    fn hex(rng: &mut SmallRng) -> String {
        format!("0x{:X}", rng.gen_range(0..0xFF_FFFFu32))
    }

    fn chart(&self, series: &VecDeque<f32>, width: f32, color: Rgba) -> Command {
        let viewport = self.viewport.size();
        let height = (viewport.y / 3.0).min(200.0);
        let top = viewport.y - height - 50.0;
        let step = viewport.x / CHART_POINTS as f32;
        let points = series
            .iter()
            .enumerate()
            .map(|(i, value)| Vec2::new(i as f32 * step, top + height - value / 100.0 * height))
            .collect();
        Command::Path {
            points,
            width,
            color,
        }
    }
}

impl Effect for Ticker {
    fn name(&self) -> &'static str {
        "ticker"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let size = viewport.size();
        let rng = &mut self.rng;
        self.streams = (0..STREAMS)
            .map(|_| Stream {
                position: Vec2::new(rng.gen_range(0.0..=size.x), rng.gen_range(0.0..=size.y)),
                speed: rng.gen_range(1.0..4.0),
                text: Self::hex(rng),
            })
            .collect();
    }

    fn update(&mut self, _context: &FrameContext) {
        self.frame += 1;
        let t = self.frame as f32;

        if self.frame % CHART_EVERY == 0 {
            let rng = &mut self.rng;
            self.primary.pop_front();
            self.primary
                .push_back(50.0 + (t * 0.05).sin() * 30.0 + rng.gen_range(-10.0..10.0));
            self.secondary.pop_front();
            self.secondary
                .push_back(30.0 + (t * 0.03).cos() * 20.0 + rng.gen_range(-7.5..7.5));
        }

        let size = self.viewport.size();
        for stream in &mut self.streams {
            stream.position.y += stream.speed;
            if stream.position.y > size.y {
                stream.position = Vec2::new(self.rng.gen_range(0.0..=size.x), -20.0);
                stream.text = Self::hex(&mut self.rng);
            }
        }
    }

    fn draw(&mut self, _context: &FrameContext, scene: &mut Scene) {
        let palette = &self.config.palette;
        let size = self.viewport.size();
        scene.fill(palette.background.alpha(0.3));

        let grid = Rgba::WHITE.alpha(0.03);
        let offset = (self.frame as f32 * 0.5) % GRID;
        let mut x = -offset;
        while x < size.x {
            scene.line(Vec2::new(x, 0.0), Vec2::new(x, size.y), 1.0, grid);
            x += GRID;
        }
        let mut y = -offset;
        while y < size.y {
            scene.line(Vec2::new(0.0, y), Vec2::new(size.x, y), 1.0, grid);
            y += GRID;
        }

        for stream in &self.streams {
            scene.push(Command::Text {
                position: stream.position,
                text: stream.text.clone(),
                size: FONT_SIZE,
                color: palette.secondary.alpha(0.4),
            });
        }

        scene.push(self.chart(&self.primary, 1.5, palette.primary.alpha(0.3)));
        scene.push(self.chart(&self.secondary, 1.0, palette.secondary.alpha(0.3)));

        if self.frame % 2 == 0 {
            let cross = Rgba::WHITE.alpha(0.02);
            let center = self.viewport.center();
            scene.line(Vec2::new(center.x, 0.0), Vec2::new(center.x, size.y), 1.0, cross);
            scene.line(Vec2::new(0.0, center.y), Vec2::new(size.x, center.y), 1.0, cross);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{effects::test_utils::run, pointer::PointerState};

    fn count(scene: &Scene, f: impl Fn(&Command) -> bool) -> usize {
        scene.commands().iter().filter(|c| f(c)).count()
    }

    #[test]
    fn test_charts_shift_every_fifth_frame() {
        let viewport = Viewport::new(800, 600);
        let mut ticker = Ticker::new(EffectConfig::new());
        ticker.resize(viewport);

        run(&mut ticker, viewport, &PointerState::default(), 4);
        assert!(ticker.series().0.iter().all(|v| *v == 50.0));

        run(&mut ticker, viewport, &PointerState::default(), 1);
        let (primary, secondary) = ticker.series();
        assert_eq!(primary.len(), CHART_POINTS);
        assert_eq!(secondary.len(), CHART_POINTS);
        assert_ne!(primary[CHART_POINTS - 1], 50.0);
        assert!((10.0..=90.0).contains(&primary[CHART_POINTS - 1]));
    }

    #[test]
    fn test_streams_fall_and_respawn_above() {
        let viewport = Viewport::new(400, 300);
        let mut ticker = Ticker::new(EffectConfig::new());
        ticker.resize(viewport);
        assert_eq!(ticker.streams.len(), STREAMS);

        run(&mut ticker, viewport, &PointerState::default(), 400);
        assert!(ticker
            .streams
            .iter()
            .all(|s| s.position.y <= 300.0 && s.text.starts_with("0x")));
    }

    #[test]
    fn test_scene_layout() {
        let viewport = Viewport::new(400, 300);
        let mut ticker = Ticker::new(EffectConfig::new());
        ticker.resize(viewport);

        let odd = run(&mut ticker, viewport, &PointerState::default(), 1);
        assert_eq!(count(&odd, |c| matches!(c, Command::Text { .. })), STREAMS);
        assert_eq!(count(&odd, |c| matches!(c, Command::Path { .. })), 2);
        // 11 columns and 8 rows shifted by half a pixel
        assert_eq!(count(&odd, |c| matches!(c, Command::Line { .. })), 11 + 8);

        let even = run(&mut ticker, viewport, &PointerState::default(), 1);
        assert_eq!(count(&even, |c| matches!(c, Command::Line { .. })), 11 + 8 + 2);

        let Command::Path { points, .. } = &even.commands()[even.commands().len() - 4] else {
            panic!("expected the first chart");
        };
        assert_eq!(points.len(), CHART_POINTS);
        assert!(points.iter().all(|p| (50.0..=250.0).contains(&p.y)));
    }
}
