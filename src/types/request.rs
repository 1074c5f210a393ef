//! Run request/response envelope
//!
//! The bridge forwards the chat-completion request to the upstream agent
//! verbatim; only `threadId` is interpreted locally.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chat-completion request to run through the bridge.
///
/// Everything except `threadId` is opaque to the bridge and serialized
/// unchanged into the upstream POST body (messages, tools, state, and
/// whatever else the agent input schema carries).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Conversation thread to continue; a fresh one is generated when absent.
    #[serde(rename = "threadId", default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    /// Opaque forwarded payload.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl RunRequest {
    /// An empty request; the bridge will generate a thread id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue an existing conversation thread.
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Attach one field of the forwarded payload.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}

/// Response descriptor for a started run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResponse {
    /// The resolved conversation thread id.
    #[serde(rename = "threadId")]
    pub thread_id: String,
}
