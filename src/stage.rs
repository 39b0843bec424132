//! ## Stage
//!
//! The [`Stage`] owns whatever the active [`Theme`] mounted. Selecting a
//! theme stops and drops every loop of the previous one before the new
//! effects are built, so at most one theme is animating at any time.

use crate::{
    backend::{SurfaceFactory, SurfaceRequest},
    effects::EffectConfig,
    error::Error,
    host::Host,
    render::{Animation, FrameLoop},
    storage::KeyValueStore,
    theme::Theme,
};

/// Mounts one theme at a time and remembers the choice.
pub struct Stage<H: Host, S, F> {
    host: H,
    store: S,
    factory: F,
    theme: Option<Theme>,
    loops: Vec<FrameLoop<H>>,
    tune: Option<Box<dyn Fn(Theme, EffectConfig) -> EffectConfig>>,
}

impl<H: Host, S, F> std::fmt::Debug for Stage<H, S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("theme", &self.theme)
            .field("loops", &self.loops)
            .finish()
    }
}

impl<H, S, F> Stage<H, S, F>
where
    H: Host + Clone + 'static,
    S: KeyValueStore,
    F: SurfaceFactory,
{
    /// Constructs an empty stage.
    pub fn new(host: H, store: S, factory: F) -> Self {
        Self {
            host,
            store,
            factory,
            theme: None,
            loops: Vec::new(),
            tune: None,
        }
    }

    /// Adjusts every effect's parameters with `tune` before it is built.
    pub fn tune(mut self, tune: impl Fn(Theme, EffectConfig) -> EffectConfig + 'static) -> Self {
        self.tune = Some(Box::new(tune));
        self
    }

    /// Mounts the stored theme, or the default one.
    pub fn restore(&mut self) -> Result<Theme, Error> {
        let theme = Theme::restore(&self.store);
        self.select(theme)?;
        Ok(theme)
    }

    /// Returns the mounted theme.
    pub fn current(&self) -> Option<Theme> {
        self.theme
    }

    /// Returns the running loops of the mounted theme, bottom first.
    pub fn loops(&self) -> &[FrameLoop<H>] {
        &self.loops
    }

    /// Returns the store the choice is persisted to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replaces the mounted theme with `theme` and persists the choice.
    ///
    /// Selecting the mounted theme again does nothing. Effects whose surface
    /// cannot be created still run, without painting.
    pub fn select(&mut self, theme: Theme) -> Result<(), Error> {
        if self.theme == Some(theme) {
            return Ok(());
        }
        self.unmount();

        let viewport = self.host.viewport();
        for mount in theme.entry().mounts {
            let effect = match &self.tune {
                Some(tune) => mount.build_with(tune(theme, mount.config)),
                None => mount.build(),
            };
            let request = SurfaceRequest {
                kind: effect.surface(),
                layer: mount.layer,
                viewport,
                fragment_shader: effect.fragment_shader(),
            };
            let surface = match self.factory.create(&request) {
                Ok(surface) => Some(surface),
                Err(e) => {
                    log::warn!(
                        "{} runs without a {} surface: {e}",
                        effect.name(),
                        request.kind
                    );
                    None
                }
            };
            let mut frame_loop =
                FrameLoop::new(self.host.clone(), Animation::new(effect, surface, viewport));
            frame_loop.start()?;
            self.loops.push(frame_loop);
        }

        if let Err(e) = theme.save(&self.store) {
            log::warn!("failed to persist theme {theme}: {e}");
        }
        log::info!("selected theme {theme}");
        self.theme = Some(theme);
        Ok(())
    }

    /// Selects the theme after the mounted one.
    pub fn toggle(&mut self) -> Result<Theme, Error> {
        let next = self.theme.unwrap_or_default().next();
        self.select(next)?;
        Ok(next)
    }

    /// Stops and drops every loop of the mounted theme.
    pub fn unmount(&mut self) {
        if let Some(theme) = self.theme.take() {
            log::debug!("unmounting theme {theme}");
        }
        self.loops.clear();
    }
}
