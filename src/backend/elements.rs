use web_sys::{wasm_bindgen::JsCast, window, Document, Element, HtmlCanvasElement, Window};

use crate::{error::Error, scene::Viewport};

/// Namespace for SVG elements.
pub(crate) const SVG_NS: &str = "http://www.w3.org/2000/svg";

pub(crate) fn get_window() -> Result<Window, Error> {
    window().ok_or(Error::UnableToRetrieveWindow)
}

pub(crate) fn get_document() -> Result<Document, Error> {
    get_window()?
        .document()
        .ok_or(Error::UnableToRetrieveDocument)
}

pub(crate) fn get_element_by_id_or_body(id: Option<&str>) -> Result<Element, Error> {
    match id {
        Some(id) => get_document()?
            .get_element_by_id(id)
            .ok_or_else(|| Error::UnableToRetrieveElementById(id.to_string())),
        None => get_document()?
            .body()
            .ok_or(Error::UnableToRetrieveBody)
            .map(|body| body.into()),
    }
}

/// Creates a full-viewport, click-through canvas inside `parent`.
///
/// The canvas is stacked at `z_index` and sized to `viewport` in CSS pixels.
pub(crate) fn create_canvas_in_element(
    parent: &Element,
    viewport: Viewport,
    z_index: i32,
) -> Result<HtmlCanvasElement, Error> {
    let element = get_document()?.create_element("canvas")?;
    element.set_attribute(
        "style",
        &format!(
            "position: fixed; inset: 0; width: 100%; height: 100%; \
             pointer-events: none; z-index: {z_index};"
        ),
    )?;

    let canvas = element
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| Error::UnableToRetrieveContext("canvas element"))?;
    canvas.set_width(viewport.width);
    canvas.set_height(viewport.height);

    parent.append_child(&canvas)?;
    Ok(canvas)
}

/// Creates a detached canvas used as a staging buffer.
pub(crate) fn create_offscreen_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement, Error> {
    let canvas = get_document()?
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| Error::UnableToRetrieveContext("canvas element"))?;
    canvas.set_width(width);
    canvas.set_height(height);
    Ok(canvas)
}
