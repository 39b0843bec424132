use std::f64::consts::TAU;

use glam::Vec2;
use web_sys::{
    js_sys::{Boolean, Map},
    wasm_bindgen::{Clamped, JsCast, JsValue},
    CanvasRenderingContext2d, HtmlCanvasElement, ImageData,
};

use crate::{
    backend::{
        color::Rgba,
        elements::{create_canvas_in_element, create_offscreen_canvas, get_element_by_id_or_body},
        Layer, Surface, SurfaceKind,
    },
    error::Error,
    scene::{Bitmap, Blend, Command, Scene, Viewport},
};

/// Options for the [`CanvasSurface`].
#[derive(Debug, Clone)]
pub struct CanvasSurfaceOptions {
    /// The element ID.
    parent_id: Option<String>,
    /// Stacking order.
    z_index: i32,
    /// Keep the context transparent so lower layers show through.
    alpha: bool,
}

impl Default for CanvasSurfaceOptions {
    fn default() -> Self {
        Self {
            parent_id: None,
            z_index: Layer::Background.z_index(),
            alpha: true,
        }
    }
}

impl CanvasSurfaceOptions {
    /// Constructs a new [`CanvasSurfaceOptions`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the element id of the canvas' parent element.
    pub fn parent_id(mut self, id: &str) -> Self {
        self.parent_id = Some(id.to_string());
        self
    }

    /// Sets the CSS `z-index` of the canvas.
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Sets whether the canvas has an alpha channel.
    pub fn alpha(mut self, alpha: bool) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Canvas element and rendering context.
#[derive(Debug)]
struct Canvas {
    /// Canvas element.
    inner: HtmlCanvasElement,
    /// Rendering context.
    context: CanvasRenderingContext2d,
}

impl Canvas {
    /// Constructs a new [`Canvas`] inside the configured parent.
    fn new(viewport: Viewport, options: &CanvasSurfaceOptions) -> Result<Self, Error> {
        let parent = get_element_by_id_or_body(options.parent_id.as_deref())?;
        let inner = create_canvas_in_element(&parent, viewport, options.z_index)?;
        let context = match context_2d(&inner, options.alpha) {
            Ok(context) => context,
            Err(error) => {
                inner.remove();
                return Err(error);
            }
        };
        Ok(Self { inner, context })
    }
}

fn context_2d(canvas: &HtmlCanvasElement, alpha: bool) -> Result<CanvasRenderingContext2d, Error> {
    let context_options = Map::new();
    context_options.set(&JsValue::from_str("alpha"), &Boolean::from(alpha));
    context_options.set(
        &JsValue::from_str("desynchronized"),
        &Boolean::from(JsValue::TRUE),
    );

    canvas
        .get_context_with_context_options("2d", &context_options)?
        .ok_or(Error::UnableToRetrieveContext("2d"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| Error::UnableToRetrieveContext("2d"))
}

/// Canvas 2D surface.
///
/// Replays geometric commands directly on the context. The scene bitmap is
/// uploaded to a detached staging canvas and stretched over the viewport,
/// so simulations can run at a fixed resolution.
#[derive(Debug)]
pub struct CanvasSurface {
    canvas: Canvas,
    staging: Option<Canvas>,
    viewport: Viewport,
}

impl CanvasSurface {
    /// Constructs a new [`CanvasSurface`] appended to `<body>`.
    pub fn new(viewport: Viewport) -> Result<Self, Error> {
        Self::new_with_options(viewport, CanvasSurfaceOptions::default())
    }

    /// Constructs a new [`CanvasSurface`] with the given options.
    pub fn new_with_options(viewport: Viewport, options: CanvasSurfaceOptions) -> Result<Self, Error> {
        Ok(Self {
            canvas: Canvas::new(viewport, &options)?,
            staging: None,
            viewport,
        })
    }

    /// Returns the canvas element.
    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas.inner
    }

    fn fill(&self, color: Rgba, blend: Blend) -> Result<(), Error> {
        let context = &self.canvas.context;
        let (w, h) = (self.viewport.width as f64, self.viewport.height as f64);
        if blend == Blend::Erase {
            context.set_global_composite_operation("destination-out")?;
        }
        context.set_fill_style_str(&color.to_css());
        context.fill_rect(0.0, 0.0, w, h);
        if blend == Blend::Erase {
            context.set_global_composite_operation("source-over")?;
        }
        Ok(())
    }

    fn stroke_path(&self, points: &[Vec2], width: f32, color: Rgba) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let context = &self.canvas.context;
        context.begin_path();
        context.move_to(first.x as f64, first.y as f64);
        for point in rest {
            context.line_to(point.x as f64, point.y as f64);
        }
        context.set_line_width(width as f64);
        context.set_stroke_style_str(&color.to_css());
        context.stroke();
    }

    fn glow(&self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba) -> Result<(), Error> {
        let (x, y, r) = (center.x as f64, center.y as f64, radius as f64);
        let gradient = self
            .canvas
            .context
            .create_radial_gradient(x, y, 0.0, x, y, r)?;
        gradient.add_color_stop(0.0, &inner.to_css())?;
        gradient.add_color_stop(1.0, &outer.to_css())?;
        self.canvas.context.set_fill_style_canvas_gradient(&gradient);
        self.canvas.context.fill_rect(x - r, y - r, r * 2.0, r * 2.0);
        Ok(())
    }

    fn bitmap(&mut self, bitmap: &Bitmap) -> Result<(), Error> {
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Ok(());
        }

        let stale = self.staging.as_ref().map_or(true, |staging| {
            staging.inner.width() != bitmap.width() || staging.inner.height() != bitmap.height()
        });
        if stale {
            let inner = create_offscreen_canvas(bitmap.width(), bitmap.height())?;
            let context = context_2d(&inner, true)?;
            self.staging = Some(Canvas { inner, context });
        }
        let Some(staging) = &self.staging else {
            return Ok(());
        };

        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(bitmap.pixels()),
            bitmap.width(),
            bitmap.height(),
        )?;
        staging.context.put_image_data(&image, 0.0, 0.0)?;
        self.canvas
            .context
            .draw_image_with_html_canvas_element_and_dw_and_dh(
                &staging.inner,
                0.0,
                0.0,
                self.viewport.width as f64,
                self.viewport.height as f64,
            )?;
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Canvas
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), Error> {
        self.viewport = viewport;
        self.canvas.inner.set_width(viewport.width);
        self.canvas.inner.set_height(viewport.height);
        Ok(())
    }

    fn present(&mut self, scene: &Scene) -> Result<(), Error> {
        for command in scene.commands() {
            match command {
                Command::Fill { color, blend } => self.fill(*color, *blend)?,
                Command::Clear => self.canvas.context.clear_rect(
                    0.0,
                    0.0,
                    self.viewport.width as f64,
                    self.viewport.height as f64,
                ),
                Command::Circle {
                    center,
                    radius,
                    color,
                } => {
                    let context = &self.canvas.context;
                    context.begin_path();
                    context.arc(
                        center.x as f64,
                        center.y as f64,
                        radius.max(0.0) as f64,
                        0.0,
                        TAU,
                    )?;
                    context.set_fill_style_str(&color.to_css());
                    context.fill();
                }
                Command::Line {
                    from,
                    to,
                    width,
                    color,
                } => self.stroke_path(&[*from, *to], *width, *color),
                Command::Path {
                    points,
                    width,
                    color,
                } => self.stroke_path(points, *width, *color),
                Command::Glow {
                    center,
                    radius,
                    inner,
                    outer,
                } => self.glow(*center, *radius, *inner, *outer)?,
                Command::Text {
                    position,
                    text,
                    size,
                    color,
                } => {
                    let context = &self.canvas.context;
                    context.set_font(&format!("{size}px monospace"));
                    context.set_text_baseline("top");
                    context.set_fill_style_str(&color.to_css());
                    context.fill_text(text, position.x as f64, position.y as f64)?;
                }
                Command::Bitmap => self.bitmap(scene.bitmap())?,
                Command::Shader(_) | Command::Displacement { .. } => {}
            }
        }
        Ok(())
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        self.canvas.inner.remove();
    }
}
