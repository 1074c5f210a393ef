//! Upstream agent event types
//!
//! The typed union of events an agent run emits over its SSE stream.
//! Dispatch is by the `type` discriminant; every event may carry an epoch
//! millisecond `timestamp` (the backend always stamps one, the protocol
//! declares it optional). Unknown fields such as `raw_event` are ignored.

use serde::{Deserialize, Serialize};

/// Role attached to a `TEXT_MESSAGE_START` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
}

/// One event of an agent run, as decoded from a `data:` frame payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentEvent {
    /// The run has started; informational only.
    RunStarted {
        thread_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
    /// A text message opens. The id must not already be open.
    TextMessageStart {
        message_id: String,
        role: Role,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
    /// A chunk of text for an open message.
    TextMessageContent {
        message_id: String,
        delta: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
    /// An open text message closes.
    TextMessageEnd {
        message_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
    /// A tool call opens.
    ToolCallStart {
        tool_call_id: String,
        tool_call_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_message_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
    /// A chunk of arguments for an open tool call.
    ///
    /// The backend serializes the argument chunk as `delta`, older
    /// producers use `tool_call_args`; both spellings are accepted.
    ToolCallArgs {
        tool_call_id: String,
        #[serde(alias = "delta")]
        tool_call_args: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
    /// An open tool call closes. Terminates the run.
    ToolCallEnd {
        tool_call_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
    /// The run has finished. Terminates the run.
    RunFinished {
        thread_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
    },
}

impl AgentEvent {
    /// Wire discriminants this union recognizes.
    pub const KNOWN_TYPES: [&'static str; 8] = [
        "RUN_STARTED",
        "TEXT_MESSAGE_START",
        "TEXT_MESSAGE_CONTENT",
        "TEXT_MESSAGE_END",
        "TOOL_CALL_START",
        "TOOL_CALL_ARGS",
        "TOOL_CALL_END",
        "RUN_FINISHED",
    ];

    /// Whether `kind` is one of the recognized `type` discriminants.
    pub fn is_known_type(kind: &str) -> bool {
        Self::KNOWN_TYPES.contains(&kind)
    }

    /// The wire discriminant of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "RUN_STARTED",
            Self::TextMessageStart { .. } => "TEXT_MESSAGE_START",
            Self::TextMessageContent { .. } => "TEXT_MESSAGE_CONTENT",
            Self::TextMessageEnd { .. } => "TEXT_MESSAGE_END",
            Self::ToolCallStart { .. } => "TOOL_CALL_START",
            Self::ToolCallArgs { .. } => "TOOL_CALL_ARGS",
            Self::ToolCallEnd { .. } => "TOOL_CALL_END",
            Self::RunFinished { .. } => "RUN_FINISHED",
        }
    }

    /// Whether this is one of the tool-call lifecycle events.
    pub fn is_tool_call(&self) -> bool {
        matches!(
            self,
            Self::ToolCallStart { .. } | Self::ToolCallArgs { .. } | Self::ToolCallEnd { .. }
        )
    }

    /// Epoch millisecond timestamp, if the producer stamped one.
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Self::RunStarted { timestamp, .. }
            | Self::TextMessageStart { timestamp, .. }
            | Self::TextMessageContent { timestamp, .. }
            | Self::TextMessageEnd { timestamp, .. }
            | Self::ToolCallStart { timestamp, .. }
            | Self::ToolCallArgs { timestamp, .. }
            | Self::ToolCallEnd { timestamp, .. }
            | Self::RunFinished { timestamp, .. } => *timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_run_started() {
        let event: AgentEvent = serde_json::from_str(
            r#"{"type":"RUN_STARTED","thread_id":"t-1","timestamp":1736956800000}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            AgentEvent::RunStarted {
                thread_id: "t-1".to_string(),
                timestamp: Some(1_736_956_800_000),
            }
        );
        assert_eq!(event.event_type(), "RUN_STARTED");
    }

    #[test]
    fn deserializes_text_message_start_roles() {
        let assistant: AgentEvent = serde_json::from_str(
            r#"{"type":"TEXT_MESSAGE_START","message_id":"m-1","role":"assistant"}"#,
        )
        .unwrap();
        assert!(matches!(
            assistant,
            AgentEvent::TextMessageStart {
                role: Role::Assistant,
                ..
            }
        ));

        let user: AgentEvent = serde_json::from_str(
            r#"{"type":"TEXT_MESSAGE_START","message_id":"m-2","role":"user"}"#,
        )
        .unwrap();
        assert!(matches!(
            user,
            AgentEvent::TextMessageStart {
                role: Role::User,
                ..
            }
        ));
    }

    #[test]
    fn timestamp_is_optional() {
        let event: AgentEvent = serde_json::from_str(
            r#"{"type":"TEXT_MESSAGE_END","message_id":"m-1"}"#,
        )
        .unwrap();
        assert_eq!(event.timestamp(), None);
    }

    #[test]
    fn tool_call_args_accepts_delta_alias() {
        let event: AgentEvent = serde_json::from_str(
            r#"{"type":"TOOL_CALL_ARGS","tool_call_id":"c-1","delta":"{\"q\":"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            AgentEvent::ToolCallArgs {
                tool_call_id: "c-1".to_string(),
                tool_call_args: "{\"q\":".to_string(),
                timestamp: None,
            }
        );
    }

    #[test]
    fn ignores_unknown_fields() {
        let event: AgentEvent = serde_json::from_str(
            r#"{"type":"TOOL_CALL_START","tool_call_id":"c-1","tool_call_name":"search","raw_event":{"x":1}}"#,
        )
        .unwrap();
        assert!(matches!(event, AgentEvent::ToolCallStart { .. }));
        assert!(event.is_tool_call());
    }

    #[test]
    fn known_type_lookup() {
        assert!(AgentEvent::is_known_type("RUN_FINISHED"));
        assert!(!AgentEvent::is_known_type("STATE_SNAPSHOT"));
    }
}
