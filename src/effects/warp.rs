use crate::{
    backend::SurfaceKind,
    effects::{Effect, EffectConfig, FrameContext},
    event::{PointerEvent, PointerEventKind},
    pointer::PointerState,
    scene::{Command, Scene, Viewport},
    sim::{Displacement, DisplacementOptions},
};

/// Liquid warp over the page content.
///
/// Every pointer move kicks a [`Displacement`] by the pointer speed; the
/// scale then relaxes back to rest and is pushed to an SVG displacement
/// filter each frame.
#[derive(Debug)]
pub struct Warp {
    config: EffectConfig,
    displacement: Displacement,
}

impl Warp {
    /// Constructs a new [`Warp`] with the default displacement tuning.
    pub fn new(config: EffectConfig) -> Self {
        Self::with_options(config, DisplacementOptions::default())
    }

    /// Constructs a new [`Warp`] with explicit displacement tuning.
    pub fn with_options(config: EffectConfig, options: DisplacementOptions) -> Self {
        Self {
            config,
            displacement: Displacement::new(options),
        }
    }

    /// Returns the displacement state.
    pub fn displacement(&self) -> &Displacement {
        &self.displacement
    }
}

impl Effect for Warp {
    fn name(&self) -> &'static str {
        "warp"
    }

    fn config(&self) -> &EffectConfig {
        &self.config
    }

    fn surface(&self) -> SurfaceKind {
        SurfaceKind::SvgFilter
    }

    fn resize(&mut self, _viewport: Viewport) {}

    fn on_pointer(&mut self, event: &PointerEvent, pointer: &PointerState) {
        if event.kind == PointerEventKind::Moved {
            self.displacement.kick(pointer.speed);
        }
    }

    fn update(&mut self, context: &FrameContext) {
        self.displacement.tick(context.time);
    }

    fn draw(&mut self, _context: &FrameContext, scene: &mut Scene) {
        scene.push(Command::Displacement {
            scale: self.displacement.applied_scale(),
            base_frequency: self.displacement.base_frequency,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{effects::test_utils::run, event::PointerSource, pointer::PointerTracker};

    #[test]
    fn test_touch_kicks_with_constant_speed() {
        let config = EffectConfig::new().touch_speed(Some(15.0));
        let mut warp = Warp::new(config);
        let mut tracker = PointerTracker::new(config.speed_decay).with_touch_speed(config.touch_speed);

        let event = PointerEvent::touched(10.0, 10.0);
        tracker.on_move(event.x, event.y, PointerSource::Touch);
        warp.on_pointer(&event, tracker.state());
        assert_eq!(warp.displacement().target_scale, 15.0 + 15.0 * 0.8);
    }

    #[test]
    fn test_records_capped_scale() {
        let mut warp = Warp::new(EffectConfig::new());
        let pointer = PointerState {
            speed: 500.0,
            ..Default::default()
        };
        warp.on_pointer(&PointerEvent::moved(0.0, 0.0), &pointer);

        let viewport = Viewport::new(100, 100);
        for frames in [1, 30, 60] {
            let scene = run(&mut warp, viewport, &pointer, frames);
            let [Command::Displacement { scale, base_frequency }] = scene.commands() else {
                panic!("unexpected commands {:?}", scene.commands());
            };
            assert!(*scale <= 30.0);
            assert_eq!(*base_frequency, 0.015);
        }
    }
}
