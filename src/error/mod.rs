//! Error Handling Module
//!
//! Core error type for the bridge plus conversions from common error types.

mod conversions;

use thiserror::Error;

/// Errors produced while coordinating a run or translating its stream.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Generic HTTP failure while talking to the upstream agent.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The upstream agent answered with a non-success status.
    #[error("API error {status}: {message}")]
    ApiError {
        /// HTTP status code returned by the upstream endpoint.
        status: u16,
        /// Response body text, if any could be read.
        message: String,
    },

    /// Failed to establish the upstream connection.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The upstream request timed out.
    #[error("Request timed out: {0}")]
    TimeoutError(String),

    /// Failure while reading the upstream byte stream.
    #[error("Stream error: {0}")]
    StreamError(String),

    /// JSON serialization/deserialization failure.
    #[error("JSON error: {0}")]
    JsonError(String),

    /// An event referenced an identifier that was never opened or already
    /// closed. Only surfaced when the translator runs with
    /// [`ViolationPolicy::Fail`](crate::streaming::ViolationPolicy).
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),
}

impl BridgeError {
    /// HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error came from the upstream transport rather than the
    /// translation pipeline itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::HttpError(_)
                | Self::ApiError { .. }
                | Self::ConnectionError(_)
                | Self::TimeoutError(_)
                | Self::StreamError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_status() {
        let err = BridgeError::ApiError {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "API error 502: bad gateway");
    }

    #[test]
    fn transport_classification() {
        assert!(BridgeError::StreamError("eof".into()).is_transport());
        assert!(!BridgeError::ProtocolViolation("m1 not open".into()).is_transport());
        assert_eq!(BridgeError::StreamError("eof".into()).status(), None);
    }
}
