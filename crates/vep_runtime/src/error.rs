//! Errors raised by script capabilities

use vep_transform::TransformError;

/// Failure of a transport to produce any response at all
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Unsupported HTTP method: {0}")]
    InvalidMethod(String),
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

/// Error type for `call`/`get`/`post`/`put`/`delete`/`parallel`/`fetch`
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),
    #[error("Request failed: {method} {url} responded {status} {status_text}")]
    RequestFailed {
        method: String,
        url: String,
        status: u16,
        status_text: String,
    },
    #[error("Fetch failed: {method} {url} responded {status} {status_text}")]
    FetchFailed {
        method: String,
        url: String,
        status: u16,
        status_text: String,
    },
    #[error("Invalid call: {0}")]
    InvalidCall(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Invalid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Unknown `utils.*` helper
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct UtilsError(#[from] TransformError);

crate::impl_js_error_class!(CallError);
crate::impl_js_error_class!(UtilsError);
