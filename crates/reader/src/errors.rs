//! Error taxonomy for reader operations.
//!
//! Every failure reaches the caller as an `Err`. A request that succeeded with
//! zero rows is `Ok(vec![])` and can never be confused with one of these.

use thiserror::Error;

/// Errors returned by [`crate::BigWaffleReader`] and [`crate::Transport`]
/// implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReaderError {
    /// The request never produced an HTTP response (DNS, refused connection,
    /// aborted or unreadable body).
    #[error("Transport failure for {url}: {message}")]
    Transport {
        /// URL that was being requested.
        url: String,
        /// Description of the underlying failure.
        message: String,
    },

    /// The service answered with a non-success HTTP status.
    #[error("{message} (HTTP {status})")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Response body text, or a generic message when the body is empty.
        message: String,
    },

    /// The response body could not be decoded per its content type, or the
    /// tabular payload is internally inconsistent.
    #[error("Could not decode response: {message}")]
    Decode {
        /// Description of the decoding problem.
        message: String,
    },

    /// The reader or transport could not be constructed from the given options.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl ReaderError {
    /// Builds a [`ReaderError::Service`] from a status and the response body.
    pub fn service(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("DDF Service responded with {status}")
        } else {
            body.to_owned()
        };
        Self::Service { status, message }
    }

    /// HTTP status of a [`ReaderError::Service`] error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable code in the `HTTP_{status}` form, for service errors.
    pub fn code(&self) -> Option<String> {
        self.status_code().map(|status| format!("HTTP_{status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_keeps_body_text() {
        let err = ReaderError::service(404, "Dataset not found\n");
        assert_eq!(
            err,
            ReaderError::Service {
                status: 404,
                message: "Dataset not found".into()
            }
        );
        assert_eq!(err.to_string(), "Dataset not found (HTTP 404)");
    }

    #[test]
    fn service_error_falls_back_to_generic_message() {
        let err = ReaderError::service(503, "  ");
        assert_eq!(err.to_string(), "DDF Service responded with 503 (HTTP 503)");
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(err.code().as_deref(), Some("HTTP_503"));
    }

    #[test]
    fn non_service_errors_carry_no_status() {
        let err = ReaderError::Decode {
            message: "eof".into(),
        };
        assert_eq!(err.status_code(), None);
        assert_eq!(err.code(), None);
    }
}
