use crate::{
    backend::{
        color::Rgba,
        elements::{get_document, get_window},
    },
    error::Error,
};

/// Sets the document title.
pub fn set_document_title(title: &str) -> Result<(), Error> {
    get_document()?.set_title(title);
    Ok(())
}

/// Paints the page behind every surface with `color`.
///
/// Themes set this so the page never flashes white between mounts.
pub fn set_page_background(color: Rgba) -> Result<(), Error> {
    let body = get_document()?.body().ok_or(Error::UnableToRetrieveBody)?;
    body.style()
        .set_property("background-color", &color.to_css())?;
    Ok(())
}

/// Open a URL in a new tab or the current tab.
pub fn open_url(url: &str, new_tab: bool) -> Result<(), Error> {
    let window = get_window()?;
    if new_tab {
        window.open_with_url_and_target(url, "_blank")?;
    } else {
        window.location().set_href(url)?;
    }
    Ok(())
}
