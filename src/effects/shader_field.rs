use glam::Vec2;

use crate::{
    backend::SurfaceKind,
    effects::{Effect, EffectConfig, FrameContext},
    event::{PointerEvent, PointerEventKind},
    pointer::PointerState,
    scene::{Command, Scene, Viewport},
    sim::ShaderUniformSet,
};

const MEMBRANE: &str = concat!(
    include_str!("../shaders/header.glsl"),
    include_str!("../shaders/noise.glsl"),
    include_str!("../shaders/membrane.frag"),
);
const GLASS: &str = concat!(
    include_str!("../shaders/header.glsl"),
    include_str!("../shaders/noise.glsl"),
    include_str!("../shaders/glass.frag"),
);
const TERMINAL: &str = concat!(
    include_str!("../shaders/header.glsl"),
    include_str!("../shaders/noise.glsl"),
    include_str!("../shaders/terminal.frag"),
);

/// Fragment programs available to a [`ShaderField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderProgram {
    /// Organic fbm membrane with a rippling pointer glow.
    Membrane,
    /// Glassy domain-warped caustics.
    Glass,
    /// Scrolling terminal grid with scanlines, grain and vignette.
    Terminal,
}

impl ShaderProgram {
    /// Returns the full fragment shader source.
    pub fn source(self) -> &'static str {
        match self {
            ShaderProgram::Membrane => MEMBRANE,
            ShaderProgram::Glass => GLASS,
            ShaderProgram::Terminal => TERMINAL,
        }
    }
}

/// How the uniforms follow the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothing {
    /// Fraction of the distance to the pointer covered per frame.
    pub pointer_lerp: f32,
    /// Fraction of the distance to the hover target covered per frame, or
    /// `None` for a constant full intensity.
    pub hover_lerp: Option<f32>,
    /// How long the hover target stays up after the last move.
    pub hover_release_ms: f32,
}

impl Smoothing {
    /// Slow drag with a long-lived hover glow.
    pub const FLUID: Smoothing = Smoothing {
        pointer_lerp: 0.05,
        hover_lerp: Some(0.02),
        hover_release_ms: 1500.0,
    };

    /// Immediate pointer with a short hover.
    pub const SNAPPY: Smoothing = Smoothing {
        pointer_lerp: 1.0,
        hover_lerp: Some(0.05),
        hover_release_ms: 500.0,
    };

    /// Slow drag, always at full intensity.
    pub const STEADY: Smoothing = Smoothing {
        pointer_lerp: 0.05,
        hover_lerp: None,
        hover_release_ms: 0.0,
    };
}

/// A full-screen fragment shader fed with smoothed pointer uniforms.
///
/// The pointer uniform eases towards the real pointer; the intensity eases
/// towards `1.0` while the pointer moved within the release window and back
/// to `0.0` afterwards.
#[derive(Debug)]
pub struct ShaderField {
    config: EffectConfig,
    program: ShaderProgram,
    smoothing: Smoothing,
    uniforms: ShaderUniformSet,
    moved: bool,
    last_move: Option<f32>,
}

impl ShaderField {
    /// Constructs a new [`ShaderField`].
    pub fn new(config: EffectConfig, program: ShaderProgram, smoothing: Smoothing) -> Self {
        let viewport = Viewport::default();
        Self {
            config,
            program,
            smoothing,
            uniforms: ShaderUniformSet {
                resolution: viewport.size(),
                pointer: viewport.center(),
                intensity: if smoothing.hover_lerp.is_some() { 0.0 } else { 1.0 },
                ..Default::default()
            },
            moved: false,
            last_move: None,
        }
    }

    /// Returns the uniforms of the last update.
    pub fn uniforms(&self) -> &ShaderUniformSet {
        &self.uniforms
    }

    /// Returns the program.
    pub fn program(&self) -> ShaderProgram {
        self.program
    }

    fn hover_target(&self, time: f32) -> f32 {
        let release = self.smoothing.hover_release_ms / 1000.0;
        match self.last_move {
            Some(last) if time - last < release => 1.0,
            _ => 0.0,
        }
    }
}

impl Effect for ShaderField {
    fn name(&self) -> &'static str {
        "shader field"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn surface(&self) -> SurfaceKind {
        SurfaceKind::WebGl2
    }

    fn fragment_shader(&self) -> Option<&'static str> {
        Some(self.program.source())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.uniforms.resolution = viewport.size();
        self.uniforms.pointer = viewport.center();
    }

    fn on_pointer(&mut self, event: &PointerEvent, _pointer: &PointerState) {
        if event.kind == PointerEventKind::Moved {
            self.moved = true;
        }
    }

    fn update(&mut self, context: &FrameContext) {
        if std::mem::take(&mut self.moved) {
            self.last_move = Some(context.time);
        }

        let pointer = context.pointer;
        if pointer.active {
            let target: Vec2 = pointer.position;
            self.uniforms.pointer = self
                .uniforms
                .pointer
                .lerp(target, self.smoothing.pointer_lerp);
        }

        if let Some(lerp) = self.smoothing.hover_lerp {
            let target = self.hover_target(context.time);
            self.uniforms.intensity += (target - self.uniforms.intensity) * lerp;
        }

        self.uniforms.time = context.time;
        self.uniforms.resolution = context.viewport.size();
    }

    fn draw(&mut self, _context: &FrameContext, scene: &mut Scene) {
        scene.push(Command::Shader(self.uniforms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::test_utils::{pointer_at, run};

    #[test]
    fn test_sources_are_complete_programs() {
        for program in [ShaderProgram::Membrane, ShaderProgram::Glass, ShaderProgram::Terminal] {
            let source = program.source();
            assert!(source.starts_with("#version 300 es"));
            assert!(source.contains("void main"));
            assert!(source.contains("u_pointer"));
        }
    }

    #[test]
    fn test_pointer_eases_towards_target() {
        let viewport = Viewport::new(400, 200);
        let mut field = ShaderField::new(EffectConfig::new(), ShaderProgram::Membrane, Smoothing::FLUID);
        field.resize(viewport);
        assert_eq!(field.uniforms().pointer, Vec2::new(200.0, 100.0));

        run(&mut field, viewport, &pointer_at(300.0, 100.0), 1);
        assert!((field.uniforms().pointer.x - 205.0).abs() < 1e-3);

        let mut snappy = ShaderField::new(EffectConfig::new(), ShaderProgram::Glass, Smoothing::SNAPPY);
        snappy.resize(viewport);
        let scene = run(&mut snappy, viewport, &pointer_at(300.0, 100.0), 1);
        assert_eq!(snappy.uniforms().pointer, Vec2::new(300.0, 100.0));
        assert_eq!(scene.commands(), &[Command::Shader(*snappy.uniforms())]);
    }

    #[test]
    fn test_hover_rises_then_releases() {
        let viewport = Viewport::new(400, 200);
        let pointer = pointer_at(100.0, 100.0);
        let mut field = ShaderField::new(EffectConfig::new(), ShaderProgram::Membrane, Smoothing::SNAPPY);
        field.resize(viewport);

        field.on_pointer(&PointerEvent::moved(100.0, 100.0), &pointer);
        // 0.5 s release window at 60 fps
        run(&mut field, viewport, &pointer, 30);
        let peak = field.uniforms().intensity;
        assert!(peak > 0.7, "{peak}");

        run(&mut field, viewport, &pointer, 120);
        assert!(field.uniforms().intensity < peak * 0.1);
    }

    #[test]
    fn test_steady_intensity() {
        let viewport = Viewport::new(400, 200);
        let mut field = ShaderField::new(EffectConfig::new(), ShaderProgram::Terminal, Smoothing::STEADY);
        run(&mut field, viewport, &PointerState::default(), 10);
        assert_eq!(field.uniforms().intensity, 1.0);
        assert_eq!(field.surface(), SurfaceKind::WebGl2);
        assert!(field.fragment_shader().is_some());
    }
}
