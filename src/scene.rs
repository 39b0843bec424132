//! Recorded draw commands for one frame.
//!
//! Effects never talk to a rendering context directly. They record a
//! [`Scene`] which a [`Surface`](crate::backend::Surface) then replays. This
//! keeps every effect testable on the host and lets one effect target
//! whichever surface its theme mounts.

use glam::Vec2;

use crate::backend::color::Rgba;
use crate::sim::ShaderUniformSet;

/// Size of the drawing area, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Constructs a new [`Viewport`].
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the size as a vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Returns the center point.
    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Returns the area in square pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width divided by height, `1.0` for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl From<(u32, u32)> for Viewport {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

/// How a fill is composited onto what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blend {
    /// Paint over (`source-over`).
    #[default]
    Over,
    /// Remove coverage (`destination-out`), used to fade persistent layers.
    Erase,
}

/// A single draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fill the whole surface with a color.
    ///
    /// A translucent color leaves trails of previous frames.
    Fill {
        /// Fill color.
        color: Rgba,
        /// Compositing mode.
        blend: Blend,
    },
    /// Clear the surface to transparent.
    Clear,
    /// A filled circle.
    Circle {
        /// Center in pixels.
        center: Vec2,
        /// Radius in pixels.
        radius: f32,
        /// Fill color.
        color: Rgba,
    },
    /// A straight line segment.
    Line {
        /// Start point.
        from: Vec2,
        /// End point.
        to: Vec2,
        /// Stroke width.
        width: f32,
        /// Stroke color.
        color: Rgba,
    },
    /// An open polyline.
    Path {
        /// Points, in order.
        points: Vec<Vec2>,
        /// Stroke width.
        width: f32,
        /// Stroke color.
        color: Rgba,
    },
    /// A radial gradient disc fading from `inner` to `outer`.
    Glow {
        /// Gradient center.
        center: Vec2,
        /// Outer radius.
        radius: f32,
        /// Color at the center.
        inner: Rgba,
        /// Color at the rim.
        outer: Rgba,
    },
    /// Monospace text.
    Text {
        /// Top-left position.
        position: Vec2,
        /// Text content.
        text: String,
        /// Font size in pixels.
        size: f32,
        /// Fill color.
        color: Rgba,
    },
    /// The scene's RGBA bitmap, stretched over the whole surface.
    Bitmap,
    /// Run the mounted fragment shader with these uniforms.
    Shader(ShaderUniformSet),
    /// Update the displacement filter parameters.
    Displacement {
        /// Displacement scale in pixels.
        scale: f32,
        /// Base frequency of the turbulence noise.
        base_frequency: f32,
    },
}

/// An RGBA8 pixel buffer owned by a [`Scene`] and reused across frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Returns the bitmap width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the bitmap height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Reallocates the buffer if the size changed and returns the bytes.
    fn resize(&mut self, width: u32, height: u32) -> &mut [u8] {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; width as usize * height as usize * 4];
        }
        &mut self.pixels
    }
}

/// The draw commands recorded for one frame.
#[derive(Debug, Default)]
pub struct Scene {
    viewport: Viewport,
    commands: Vec<Command>,
    bitmap: Bitmap,
}

impl Scene {
    /// Constructs an empty scene for the given viewport.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    /// Returns the viewport the scene is recorded for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Drops the recorded commands but keeps allocations.
    pub fn reset(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.commands.clear();
    }

    /// Returns the recorded commands.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns the bitmap referenced by [`Command::Bitmap`].
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Records a command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Records a full-surface fill.
    pub fn fill(&mut self, color: Rgba) {
        self.push(Command::Fill {
            color,
            blend: Blend::Over,
        });
    }

    /// Records a filled circle.
    pub fn circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.push(Command::Circle {
            center,
            radius,
            color,
        });
    }

    /// Records a line segment.
    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.push(Command::Line {
            from,
            to,
            width,
            color,
        });
    }

    /// Records a radial glow fading to transparent.
    pub fn glow(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.push(Command::Glow {
            center,
            radius,
            inner: color,
            outer: color.alpha(0.0),
        });
    }

    /// Returns a zeroed-or-stale bitmap of the given size to paint into and
    /// records a [`Command::Bitmap`] that presents it.
    pub fn bitmap_mut(&mut self, width: u32, height: u32) -> &mut [u8] {
        self.commands.push(Command::Bitmap);
        self.bitmap.resize(width, height)
    }
}
