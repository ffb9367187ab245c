//! Transport port.
//!
//! The reader never performs I/O itself. It hands a fully built URL to a
//! [`Transport`] and inspects the [`TransportResponse`] it gets back. The
//! `transport` crate supplies the `reqwest` implementation; tests supply
//! in-memory fakes.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::ReaderError;

/// Status, content type and body of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code after redirects were followed.
    pub status: u16,
    /// Value of the `Content-Type` header, if present and valid text.
    pub content_type: Option<String>,
    /// Complete response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Returns `true` for `2xx` statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` if the declared content type is JSON.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs `GET` requests on behalf of the reader.
///
/// Implementations follow redirects, send the credentials (cookies) they hold
/// for the target origin, and return every HTTP response, successful or not,
/// as `Ok`. Only failures that prevent a response from being received map to
/// [`ReaderError::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url` and returns the complete response.
    async fn get(&self, url: &Url) -> Result<TransportResponse, ReaderError>;
}
