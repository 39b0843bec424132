//! ## Surfaces
//!
//! A [`Surface`] replays a recorded [`Scene`] onto something the browser
//! displays. Effects never hold a rendering context; the frame loop hands
//! each frame's scene to whichever surface the theme mounted.
//!
//! - [`CanvasSurface`]: Canvas 2D. Handles every geometric command and the
//!   scene bitmap.
//! - [`WebGl2Surface`]: runs one fullscreen fragment shader fed by
//!   [`Command::Shader`](crate::scene::Command::Shader) uniforms.
//! - [`SvgFilterSurface`]: an `feTurbulence`/`feDisplacementMap` filter
//!   applied to the page content, driven by
//!   [`Command::Displacement`](crate::scene::Command::Displacement).
//!
//! | Command        | CanvasSurface | WebGl2Surface | SvgFilterSurface |
//! |----------------|---------------|---------------|------------------|
//! | Fill / Clear   | ✓             | ✓             | ✗                |
//! | Shapes / Text  | ✓             | ✗             | ✗                |
//! | Bitmap         | ✓             | ✗             | ✗                |
//! | Shader         | ✗             | ✓             | ✗                |
//! | Displacement   | ✗             | ✗             | ✓                |
//!
//! Commands a surface cannot express are skipped.
//!
//! Surfaces own their DOM elements and remove them when dropped.

/// Canvas 2D surface.
pub mod canvas;

/// WebGL2 shader surface.
pub mod webgl2;

/// SVG displacement filter surface.
pub mod svg;

/// Color handling.
pub mod color;

/// Recording surface for tests.
pub mod recording;

/// DOM helpers.
pub(crate) mod elements;

pub use canvas::{CanvasSurface, CanvasSurfaceOptions};
pub use svg::SvgFilterSurface;
pub use webgl2::{WebGl2Surface, WebGl2SurfaceOptions};

use std::fmt;

use crate::{
    error::Error,
    scene::{Scene, Viewport},
};

/// The kinds of surface a theme can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// A 2D canvas.
    Canvas,
    /// A WebGL2 canvas running a fragment shader.
    WebGl2,
    /// An SVG filter over the page content.
    SvgFilter,
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SurfaceKind::Canvas => "canvas",
            SurfaceKind::WebGl2 => "webgl2",
            SurfaceKind::SvgFilter => "svg filter",
        })
    }
}

/// Where a surface is stacked relative to the page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Behind the content.
    Background,
    /// Above the content, click-through.
    Overlay,
}

impl Layer {
    /// CSS `z-index` for the layer.
    pub fn z_index(self) -> i32 {
        match self {
            Layer::Background => -1,
            Layer::Overlay => 50,
        }
    }
}

/// Something a recorded [`Scene`] can be presented on.
pub trait Surface {
    /// Returns the kind of the surface.
    fn kind(&self) -> SurfaceKind;

    /// Matches the drawing buffer to the new viewport.
    fn resize(&mut self, viewport: Viewport) -> Result<(), Error>;

    /// Replays every command of `scene` this surface supports.
    fn present(&mut self, scene: &Scene) -> Result<(), Error>;
}

/// What a theme asks for when it mounts an effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRequest {
    /// Kind of surface.
    pub kind: SurfaceKind,
    /// Stacking layer.
    pub layer: Layer,
    /// Initial size.
    pub viewport: Viewport,
    /// Fragment shader body for [`SurfaceKind::WebGl2`].
    pub fragment_shader: Option<&'static str>,
}

/// Creates surfaces on demand.
pub trait SurfaceFactory {
    /// Creates a surface for `request`.
    ///
    /// Failing to create one is not fatal: the caller runs the effect
    /// without painting.
    fn create(&mut self, request: &SurfaceRequest) -> Result<Box<dyn Surface>, Error>;
}

/// [`SurfaceFactory`] that creates DOM-backed surfaces.
#[derive(Debug, Clone, Default)]
pub struct BrowserSurfaces {
    parent_id: Option<String>,
    content_id: Option<String>,
}

impl BrowserSurfaces {
    /// Constructs a factory that appends canvases to `<body>`.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the element id canvases are appended to.
    pub fn parent_id(mut self, id: &str) -> Self {
        self.parent_id = Some(id.to_string());
        self
    }

    /// Sets the element id SVG filters are applied to.
    pub fn content_id(mut self, id: &str) -> Self {
        self.content_id = Some(id.to_string());
        self
    }
}

impl SurfaceFactory for BrowserSurfaces {
    fn create(&mut self, request: &SurfaceRequest) -> Result<Box<dyn Surface>, Error> {
        let z_index = request.layer.z_index();
        Ok(match request.kind {
            SurfaceKind::Canvas => {
                let mut options = CanvasSurfaceOptions::new().z_index(z_index);
                if let Some(id) = &self.parent_id {
                    options = options.parent_id(id);
                }
                Box::new(CanvasSurface::new_with_options(request.viewport, options)?)
            }
            SurfaceKind::WebGl2 => {
                let shader = request
                    .fragment_shader
                    .ok_or_else(|| Error::Shader("no fragment shader requested".into()))?;
                let mut options = WebGl2SurfaceOptions::new(shader).z_index(z_index);
                if let Some(id) = &self.parent_id {
                    options = options.parent_id(id);
                }
                Box::new(WebGl2Surface::new_with_options(request.viewport, options)?)
            }
            SurfaceKind::SvgFilter => {
                Box::new(SvgFilterSurface::new(self.content_id.as_deref())?)
            }
        })
    }
}
