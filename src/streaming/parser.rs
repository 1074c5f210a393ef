//! Event parser
//!
//! Maps a decoded frame payload to the typed [`AgentEvent`] union.
//! Both failure modes are non-fatal to the pipeline: the pump logs the
//! diagnostic and drops the frame.

use thiserror::Error;

use crate::types::AgentEvent;

/// Why a frame payload did not produce an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The `type` discriminant is not part of the recognized union.
    #[error("unrecognized event type: {0}")]
    UnrecognizedEventType(String),

    /// The payload is not well-formed JSON, or a recognized event is
    /// missing required fields.
    #[error("malformed event payload: {0}")]
    MalformedPayload(String),
}

/// Parse one frame payload into an [`AgentEvent`].
pub fn parse_event(payload: &str) -> Result<AgentEvent, ParseError> {
    match serde_json::from_str::<AgentEvent>(payload) {
        Ok(event) => Ok(event),
        Err(err) => {
            // Re-probe so an unknown discriminant is reported as such
            // rather than as a generic deserialization failure.
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(payload) {
                if let Some(kind) = value.get("type").and_then(|t| t.as_str()) {
                    if !AgentEvent::is_known_type(kind) {
                        return Err(ParseError::UnrecognizedEventType(kind.to_string()));
                    }
                }
            }
            Err(ParseError::MalformedPayload(err.to_string()))
        }
    }
}
