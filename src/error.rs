use web_sys::wasm_bindgen;

/// Custom error implementation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Unable to retrieve window.
    ///
    /// This error occurs when [`web_sys::window()`] returns `None`.
    #[error("Unable to retrieve window")]
    UnableToRetrieveWindow,

    /// Unable to retrieve document.
    ///
    /// This error occurs when `window.document()` returns `None`.
    #[error("Unable to retrieve document")]
    UnableToRetrieveDocument,

    /// Unable to retrieve body.
    ///
    /// This error occurs when `document.body()` returns `None`.
    #[error("Unable to retrieve body")]
    UnableToRetrieveBody,

    /// Unable to retrieve an element by its ID.
    #[error("Unable to retrieve element by id: {0}")]
    UnableToRetrieveElementById(String),

    /// Unable to retrieve a rendering context.
    ///
    /// This error occurs when `canvas.get_context(kind)` returns `None`,
    /// e.g. when WebGL2 is not supported by the browser.
    #[error("Unable to retrieve {0} context")]
    UnableToRetrieveContext(&'static str),

    /// Shader compilation or program linking failed.
    #[error("Shader error: {0}")]
    Shader(String),

    /// Local storage is not available (private mode, disabled cookies).
    #[error("Local storage is unavailable")]
    StorageUnavailable,

    /// The server answered a fetch with a non-success status.
    #[error("Fetch of {url} failed with status {status}")]
    FetchStatus {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Persisted state could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// JS value error.
    #[error("JS value error: {0:?}")]
    JsValue(wasm_bindgen::JsValue),
}

/// Convert [`wasm_bindgen::JsValue`] to [`Error`].
impl From<wasm_bindgen::JsValue> for Error {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::JsValue(value)
    }
}

/// Convert [`Error`] to [`wasm_bindgen::JsValue`] so it can cross the JS boundary.
impl From<Error> for wasm_bindgen::JsValue {
    fn from(error: Error) -> Self {
        match error {
            Error::JsValue(value) => value,
            error => wasm_bindgen::JsValue::from_str(&error.to_string()),
        }
    }
}
