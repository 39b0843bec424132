//! ## Themes
//!
//! A [`Theme`] names one look of the site. The registry maps each theme to
//! the effects it mounts and the parameter table they run with.
//!
//! | Theme         | Effects                   |
//! |---------------|---------------------------|
//! | `liquid`      | [`Ripple`] + [`Warp`]     |
//! | `galaxy`      | [`Galaxy`]                |
//! | `alive`       | [`Constellation`]         |
//! | `neural`      | [`ShaderField`] membrane  |
//! | `vision`      | [`ShaderField`] glass     |
//! | `proof`       | [`ShaderField`] terminal  |
//! | `paper`       | [`Ink`]                   |
//! | `progression` | [`Drift`]                 |
//! | `hidden`      | [`Orbs`]                  |
//! | `lesp`        | [`Ticker`]                |
//! | `god`         | [`Tension`]               |
//! | `ai`          | [`Aurora`]                |

use std::{fmt, str::FromStr};

use crate::{
    backend::{color::Rgba, Layer},
    effects::{
        Aurora, Constellation, Drift, Effect, EffectConfig, Galaxy, Ink, Orbs, Palette, Ripple,
        ShaderField, ShaderProgram, Smoothing, Tension, Ticker, Warp,
    },
    storage::KeyValueStore,
};

/// Storage key of the last selected theme.
pub const THEME_KEY: &str = "vitrine.theme";

/// A visual theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    /// Glass ripples under a warping displacement filter.
    #[default]
    Liquid,
    /// A rotating spiral galaxy.
    Galaxy,
    /// A living particle network.
    Alive,
    /// An organic fbm membrane shader.
    Neural,
    /// A bright glass shader.
    Vision,
    /// A green terminal grid shader.
    Proof,
    /// Ink on paper.
    Paper,
    /// Slow falling particles.
    Progression,
    /// An almost black page with grain.
    Hidden,
    /// Data streams and live charts.
    Lesp,
    /// Particles that tense up under fast moves.
    God,
    /// Drifting lights and data lines.
    Ai,
}

/// Error returned when parsing an unknown theme name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme: {0}")]
pub struct UnknownTheme(String);

impl Theme {
    /// Every theme, in toggle order.
    pub const ALL: [Theme; 12] = [
        Theme::Liquid,
        Theme::Galaxy,
        Theme::Alive,
        Theme::Neural,
        Theme::Vision,
        Theme::Proof,
        Theme::Paper,
        Theme::Progression,
        Theme::Hidden,
        Theme::Lesp,
        Theme::God,
        Theme::Ai,
    ];

    /// Returns the lowercase name the theme is stored under.
    pub fn name(self) -> &'static str {
        match self {
            Theme::Liquid => "liquid",
            Theme::Galaxy => "galaxy",
            Theme::Alive => "alive",
            Theme::Neural => "neural",
            Theme::Vision => "vision",
            Theme::Proof => "proof",
            Theme::Paper => "paper",
            Theme::Progression => "progression",
            Theme::Hidden => "hidden",
            Theme::Lesp => "lesp",
            Theme::God => "god",
            Theme::Ai => "ai",
        }
    }

    /// Returns the theme after this one, wrapping around.
    pub fn next(self) -> Theme {
        let index = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Reads the stored theme, falling back to the default when nothing or
    /// something unknown is stored.
    pub fn restore(store: &impl KeyValueStore) -> Theme {
        match store.get(THEME_KEY) {
            Ok(Some(name)) => name.parse().unwrap_or_else(|e| {
                log::warn!("ignoring stored theme: {e}");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                log::warn!("failed to read stored theme: {e}");
                Theme::default()
            }
        }
    }

    /// Writes the theme to `store`.
    pub fn save(self, store: &impl KeyValueStore) -> Result<(), crate::error::Error> {
        store.set(THEME_KEY, self.name())
    }

    /// Returns the registry entry of this theme.
    pub fn entry(self) -> &'static ThemeEntry {
        &REGISTRY[self as usize]
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.name() == s)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

/// One effect a theme mounts.
#[derive(Debug, Clone, Copy)]
pub struct Mount {
    /// Stacking layer of the effect's surface.
    pub layer: Layer,
    /// Parameters the effect is built with.
    pub config: EffectConfig,
    build: fn(EffectConfig) -> Box<dyn Effect>,
}

impl Mount {
    /// Builds a fresh effect.
    pub fn build(&self) -> Box<dyn Effect> {
        (self.build)(self.config)
    }

    /// Builds a fresh effect with `config` instead of the theme's own.
    pub fn build_with(&self, config: EffectConfig) -> Box<dyn Effect> {
        (self.build)(config)
    }
}

/// What a theme looks like.
#[derive(Debug, Clone, Copy)]
pub struct ThemeEntry {
    /// The theme.
    pub theme: Theme,
    /// Human readable name.
    pub label: &'static str,
    /// Color of the page behind every surface.
    pub page: Rgba,
    /// Effects to mount, bottom first.
    pub mounts: &'static [Mount],
}

const fn palette(background: u32, primary: u32, secondary: u32, accent: u32) -> Palette {
    Palette {
        background: Rgba::hex(background),
        primary: Rgba::hex(primary),
        secondary: Rgba::hex(secondary),
        accent: Rgba::hex(accent),
    }
}

const fn config(palette: Palette) -> EffectConfig {
    EffectConfig {
        palette,
        ..EffectConfig::DEFAULT
    }
}

const fn background(config: EffectConfig, build: fn(EffectConfig) -> Box<dyn Effect>) -> Mount {
    Mount {
        layer: Layer::Background,
        config,
        build,
    }
}

/// Ripple tint over the light liquid page.
pub const LIQUID: EffectConfig = EffectConfig {
    damping: 0.96,
    force_radius: 0.1,
    force: 0.1,
    ambient: 0.005,
    touch_speed: Some(15.0),
    grid: 512,
    ..config(palette(0xf8fafc, 0x99b3d9, 0xcbd5e1, 0xffffff))
};

/// Hot core, cool arms.
pub const GALAXY: EffectConfig = EffectConfig {
    particle_count: 8000,
    ..config(palette(0x030305, 0xff6030, 0x1b3984, 0xff6030))
};

/// Cyan particle network on black.
pub const ALIVE: EffectConfig = EffectConfig {
    particle_count: 200,
    force_radius: 150.0,
    force: 0.5,
    ..config(palette(0x000000, 0x66e6ff, 0x0891b2, 0x22d3ee))
};

/// Dark violet membrane.
pub const NEURAL: EffectConfig = config(palette(0x050008, 0xb069ff, 0x3b0764, 0xe9d5ff));

/// Off-white glass.
pub const VISION: EffectConfig = config(palette(0xf5f7fa, 0xffffff, 0xe6ebf2, 0xd9e6ff));

/// Terminal green.
pub const PROOF: EffectConfig = config(palette(0x030504, 0x004d1a, 0x1a6633, 0x1a6633));

/// Slate ink on cream paper.
pub const PAPER: EffectConfig = config(palette(0xfdfcf0, 0x0f172a, 0x334155, 0x0f172a));

/// Slate snow on a midnight page.
pub const PROGRESSION: EffectConfig = EffectConfig {
    particle_count: 2000,
    ..config(palette(0x020617, 0x334155, 0x1e293b, 0x334155))
};

/// One dim orb on near black.
pub const HIDDEN: EffectConfig = config(palette(0x030303, 0x141414, 0x0a0a0a, 0x141414));

/// Monochrome market data.
pub const LESP: EffectConfig = config(palette(0x050505, 0xc8c8c8, 0x646464, 0xffffff));

/// Blue tension field; one particle per 8000 square pixels.
pub const GOD: EffectConfig = EffectConfig {
    speed_decay: 0.9,
    particle_count: 8000,
    force_radius: 150.0,
    ..config(palette(0x030508, 0x6496ff, 0x64c8ff, 0x3296ff))
};

/// Cyan and blue lights with silver lines.
pub const AI: EffectConfig = config(palette(0x0a0a0c, 0x06b6d4, 0x3b82f6, 0x94a3b8));

static REGISTRY: [ThemeEntry; 12] = [
    ThemeEntry {
        theme: Theme::Liquid,
        label: "Liquid",
        page: Rgba::hex(0xf8fafc),
        mounts: &[
            Mount {
                layer: Layer::Overlay,
                config: LIQUID,
                build: |config| Box::new(Ripple::new(config)),
            },
            Mount {
                layer: Layer::Overlay,
                config: LIQUID,
                build: |config| Box::new(Warp::new(config)),
            },
        ],
    },
    ThemeEntry {
        theme: Theme::Galaxy,
        label: "Galaxy",
        page: Rgba::hex(0x030305),
        mounts: &[background(GALAXY, |config| Box::new(Galaxy::new(config)))],
    },
    ThemeEntry {
        theme: Theme::Alive,
        label: "Alive",
        page: Rgba::hex(0x000000),
        mounts: &[background(ALIVE, |config| Box::new(Constellation::new(config)))],
    },
    ThemeEntry {
        theme: Theme::Neural,
        label: "Neural",
        page: Rgba::hex(0x050008),
        mounts: &[background(NEURAL, |config| {
            Box::new(ShaderField::new(config, ShaderProgram::Membrane, Smoothing::FLUID))
        })],
    },
    ThemeEntry {
        theme: Theme::Vision,
        label: "Vision",
        page: Rgba::hex(0xf5f7fa),
        mounts: &[background(VISION, |config| {
            Box::new(ShaderField::new(config, ShaderProgram::Glass, Smoothing::SNAPPY))
        })],
    },
    ThemeEntry {
        theme: Theme::Proof,
        label: "Proof",
        page: Rgba::hex(0x030504),
        mounts: &[background(PROOF, |config| {
            Box::new(ShaderField::new(config, ShaderProgram::Terminal, Smoothing::STEADY))
        })],
    },
    ThemeEntry {
        theme: Theme::Paper,
        label: "Paper",
        page: Rgba::hex(0xfdfcf0),
        mounts: &[background(PAPER, |config| Box::new(Ink::new(config)))],
    },
    ThemeEntry {
        theme: Theme::Progression,
        label: "Progression",
        page: Rgba::hex(0x020617),
        mounts: &[background(PROGRESSION, |config| Box::new(Drift::new(config)))],
    },
    ThemeEntry {
        theme: Theme::Hidden,
        label: "Hidden",
        page: Rgba::hex(0x030303),
        mounts: &[background(HIDDEN, |config| Box::new(Orbs::new(config)))],
    },
    ThemeEntry {
        theme: Theme::Lesp,
        label: "Lesp",
        page: Rgba::hex(0x020202),
        mounts: &[background(LESP, |config| Box::new(Ticker::new(config)))],
    },
    ThemeEntry {
        theme: Theme::God,
        label: "God",
        page: Rgba::hex(0x030508),
        mounts: &[background(GOD, |config| Box::new(Tension::new(config)))],
    },
    ThemeEntry {
        theme: Theme::Ai,
        label: "AI",
        page: Rgba::hex(0x0a0a0c),
        mounts: &[background(AI, |config| Box::new(Aurora::new(config)))],
    },
];
