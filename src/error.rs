//! Error types shared across the pipeline.
//!
//! Remote failures are almost never propagated to `main`: each stage turns
//! a [`FetchError`] into a sentinel value and logs it. The types exist so
//! that callers can tell a non-success status from a transport failure,
//! which maps to different sentinels.

use thiserror::Error;

/// Failure while fetching a remote resource.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("unexpected content type {content_type:?} from {url}")]
    ContentType { content_type: String, url: String },

    #[error("response from {url} too small ({bytes} bytes)")]
    TooSmall { bytes: usize, url: String },

    #[error("invalid url {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Short name of the failure kind, used in sentinel strings.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(e) if e.is_timeout() => "Timeout",
            FetchError::Transport(e) if e.is_connect() => "ConnectionError",
            FetchError::Transport(_) => "RequestException",
            FetchError::Status { .. } => "HTTPError",
            FetchError::ContentType { .. } => "ContentTypeError",
            FetchError::TooSmall { .. } => "TooSmall",
            FetchError::InvalidUrl(_) => "InvalidURL",
        }
    }
}

/// Failure while producing the static page or its sidecar files.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
