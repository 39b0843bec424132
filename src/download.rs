//! ## Downloads
//!
//! [`download_resume`] fetches an [`Asset`] and hands it to the browser as a
//! file download. When anything on the way fails, the asset is opened in a
//! new tab instead, so the visitor always gets the file.

use wasm_bindgen_futures::JsFuture;
use web_sys::{
    wasm_bindgen::{JsCast, JsValue},
    Blob, Document, HtmlAnchorElement, HtmlElement, Response, Url,
};

use crate::{
    backend::elements::{get_document, get_window},
    error::Error,
    utils::open_url,
};

/// A downloadable file served next to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// URL the file is fetched from.
    pub url: String,
    /// Name the browser saves the file as.
    pub file_name: String,
}

impl Asset {
    /// Constructs an asset.
    pub fn new(url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            file_name: file_name.into(),
        }
    }

    /// The resume PDF.
    pub fn resume() -> Self {
        Self::new(
            "/assets/Tushar_Washishtha_Resume_Fixed.pdf",
            "Tushar_Washishtha_Resume_Fixed.pdf",
        )
    }
}

impl Default for Asset {
    fn default() -> Self {
        Self::resume()
    }
}

/// Where a fetched asset ends up.
pub trait DownloadSink {
    /// Fetched file contents.
    type Payload;

    /// Saves `payload` under the asset's file name.
    fn save(&mut self, asset: &Asset, payload: Self::Payload) -> Result<(), Error>;

    /// Opens `url` directly, used when saving is not possible.
    fn open_fallback(&mut self, url: &str);
}

/// Saves a fetched asset or falls back to opening its URL.
///
/// Returns `true` if the payload was saved. Errors are logged, never
/// returned.
pub fn finish_download<S: DownloadSink>(
    sink: &mut S,
    asset: &Asset,
    fetched: Result<S::Payload, Error>,
) -> bool {
    match fetched.and_then(|payload| sink.save(asset, payload)) {
        Ok(()) => {
            log::info!("downloaded {}", asset.file_name);
            true
        }
        Err(e) => {
            log::error!("download of {} failed, opening it instead: {e}", asset.url);
            sink.open_fallback(&asset.url);
            false
        }
    }
}

/// Saves blobs through a synthesized `<a download>` element.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDownloads;

impl DownloadSink for BrowserDownloads {
    type Payload = Blob;

    fn save(&mut self, asset: &Asset, payload: Blob) -> Result<(), Error> {
        let document = get_document()?;
        let body = document.body().ok_or(Error::UnableToRetrieveBody)?;
        let url = Url::create_object_url_with_blob(&payload)?;

        let clicked = click_link(&document, &body, &url, &asset.file_name);
        release(clicked, || Ok(Url::revoke_object_url(&url)?))
    }

    fn open_fallback(&mut self, url: &str) {
        if let Err(e) = open_url(url, true) {
            log::error!("failed to open {url}: {e}");
        }
    }
}

fn click_link(
    document: &Document,
    body: &HtmlElement,
    url: &str,
    file_name: &str,
) -> Result<(), Error> {
    let link = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(JsValue::from)?;
    link.set_href(url);
    link.set_download(file_name);
    body.append_child(&link)?;
    link.click();
    body.remove_child(&link)?;
    Ok(())
}

/// Runs `cleanup` whatever `result` is. The first error wins.
fn release<T>(
    result: Result<T, Error>,
    cleanup: impl FnOnce() -> Result<(), Error>,
) -> Result<T, Error> {
    let cleaned = cleanup();
    let value = result?;
    cleaned.map(|()| value)
}

/// Fetches `asset` and saves it, falling back to a new tab on failure.
///
/// Returns `true` if the file was saved.
pub async fn download_resume(asset: &Asset) -> bool {
    let fetched = fetch_blob(&asset.url).await;
    finish_download(&mut BrowserDownloads, asset, fetched)
}

async fn fetch_blob(url: &str) -> Result<Blob, Error> {
    let response: Response = JsFuture::from(get_window()?.fetch_with_str(url))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(Error::FetchStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }
    let blob = JsFuture::from(response.blob()?).await?.dyn_into()?;
    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sink {
        saved: Vec<(String, Vec<u8>)>,
        fallbacks: Vec<String>,
        refuse: bool,
    }

    impl DownloadSink for Sink {
        type Payload = Vec<u8>;

        fn save(&mut self, asset: &Asset, payload: Vec<u8>) -> Result<(), Error> {
            if self.refuse {
                return Err(Error::UnableToRetrieveBody);
            }
            self.saved.push((asset.file_name.clone(), payload));
            Ok(())
        }

        fn open_fallback(&mut self, url: &str) {
            self.fallbacks.push(url.to_string());
        }
    }

    fn not_found(asset: &Asset) -> Error {
        Error::FetchStatus {
            url: asset.url.clone(),
            status: 404,
        }
    }

    #[test]
    fn test_saves_fetched_payload() {
        let mut sink = Sink::default();
        let asset = Asset::default();
        assert!(finish_download(&mut sink, &asset, Ok(vec![1, 2, 3])));
        assert_eq!(
            sink.saved,
            vec![("Tushar_Washishtha_Resume_Fixed.pdf".to_string(), vec![1, 2, 3])]
        );
        assert!(sink.fallbacks.is_empty());
    }

    #[test]
    fn test_fetch_failure_falls_back_once() {
        let mut sink = Sink::default();
        let asset = Asset::resume();
        assert!(!finish_download(&mut sink, &asset, Err(not_found(&asset))));
        assert!(sink.saved.is_empty());
        assert_eq!(sink.fallbacks, vec![asset.url]);
    }

    #[test]
    fn test_save_failure_falls_back_once() {
        let mut sink = Sink {
            refuse: true,
            ..Default::default()
        };
        let asset = Asset::new("/assets/cv.pdf", "cv.pdf");
        assert!(!finish_download(&mut sink, &asset, Ok(vec![0])));
        assert_eq!(sink.fallbacks, vec!["/assets/cv.pdf".to_string()]);
    }

    #[test]
    fn test_release_runs_after_failure() {
        let mut released = 0;
        let result: Result<(), Error> = release(Err(Error::UnableToRetrieveBody), || {
            released += 1;
            Ok(())
        });
        assert!(matches!(result, Err(Error::UnableToRetrieveBody)));
        assert_eq!(released, 1);
    }

    #[test]
    fn test_release_keeps_first_error() {
        let result = release(Ok(7), || Err(Error::UnableToRetrieveDocument));
        assert!(matches!(result, Err(Error::UnableToRetrieveDocument)));

        let result: Result<(), Error> = release(Err(Error::UnableToRetrieveBody), || {
            Err(Error::UnableToRetrieveDocument)
        });
        assert!(matches!(result, Err(Error::UnableToRetrieveBody)));

        assert!(matches!(release(Ok(7), || Ok(())), Ok(7)));
    }
}
