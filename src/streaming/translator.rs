//! Event translator
//!
//! The per-run state machine. Consumes upstream events in decode order,
//! tracks which message and tool-call identifiers are open, emits the
//! corresponding downstream sink calls, and reports when a terminating
//! event (`TOOL_CALL_END` or `RUN_FINISHED`) was reached.
//!
//! A frame referencing an identifier that was never opened, or was
//! already closed, is a protocol violation. The default policy logs and
//! ignores the frame (a start for an already-open identifier is treated
//! the same way); [`ViolationPolicy::Fail`] terminates the run instead.

use std::collections::HashSet;

use crate::error::BridgeError;
use crate::sink::RuntimeSink;
use crate::types::AgentEvent;

/// What to do with a frame that violates identifier continuity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViolationPolicy {
    /// Log the violation and ignore the frame (upstream-compatible default).
    #[default]
    Warn,
    /// Terminate the run with [`BridgeError::ProtocolViolation`].
    Fail,
}

/// Configuration of the supported event set and violation handling.
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    /// Translate tool-call events into action execution events. When
    /// disabled they take the unsupported-event path and `RUN_FINISHED`
    /// is the only terminator.
    pub tool_calls: bool,

    /// Identifier-continuity violation handling.
    pub violations: ViolationPolicy,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            tool_calls: true,
            violations: ViolationPolicy::Warn,
        }
    }
}

impl TranslatorOptions {
    /// Text-message translation only, for runtimes that don't execute
    /// actions.
    pub fn text_only() -> Self {
        Self {
            tool_calls: false,
            ..Default::default()
        }
    }

    /// Terminate the run on identifier-continuity violations.
    pub fn strict() -> Self {
        Self {
            violations: ViolationPolicy::Fail,
            ..Default::default()
        }
    }
}

/// Translation state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Terminal; no further events are translated.
    Finished,
}

/// Per-run translation state machine.
#[derive(Debug)]
pub struct EventTranslator {
    options: TranslatorOptions,
    open_messages: HashSet<String>,
    open_tool_calls: HashSet<String>,
    state: RunState,
}

impl EventTranslator {
    pub fn new(options: TranslatorOptions) -> Self {
        Self {
            options,
            open_messages: HashSet::new(),
            open_tool_calls: HashSet::new(),
            state: RunState::Running,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == RunState::Finished
    }

    /// Translate one upstream event into downstream sink calls.
    ///
    /// Returns the state after the event; `Err` only under
    /// [`ViolationPolicy::Fail`].
    pub fn apply<S>(&mut self, event: AgentEvent, sink: &mut S) -> Result<RunState, BridgeError>
    where
        S: RuntimeSink + ?Sized,
    {
        if self.state == RunState::Finished {
            tracing::debug!("ignoring event after run finished: {}", event.event_type());
            return Ok(self.state);
        }

        if !self.options.tool_calls && event.is_tool_call() {
            tracing::warn!("unexpected event type: {}", event.event_type());
            return Ok(self.state);
        }

        match event {
            AgentEvent::RunStarted { thread_id, .. } => {
                tracing::debug!("run started for thread {}", thread_id);
            }
            AgentEvent::TextMessageStart { message_id, .. } => {
                if !self.open_messages.insert(message_id.clone()) {
                    return self.violation(format!("message {message_id} is already open"));
                }
                sink.text_message_start(&message_id);
            }
            AgentEvent::TextMessageContent {
                message_id, delta, ..
            } => {
                if !self.open_messages.contains(&message_id) {
                    return self.violation(format!("message {message_id} is not open"));
                }
                sink.text_message_content(&message_id, &delta);
            }
            AgentEvent::TextMessageEnd { message_id, .. } => {
                if !self.open_messages.remove(&message_id) {
                    return self.violation(format!("message {message_id} is not open"));
                }
                sink.text_message_end(&message_id);
            }
            AgentEvent::ToolCallStart {
                tool_call_id,
                tool_call_name,
                parent_message_id,
                ..
            } => {
                if !self.open_tool_calls.insert(tool_call_id.clone()) {
                    return self.violation(format!("tool call {tool_call_id} is already open"));
                }
                sink.action_execution_start(
                    &tool_call_id,
                    &tool_call_name,
                    parent_message_id.as_deref(),
                );
            }
            AgentEvent::ToolCallArgs {
                tool_call_id,
                tool_call_args,
                ..
            } => {
                if !self.open_tool_calls.contains(&tool_call_id) {
                    return self.violation(format!("tool call {tool_call_id} is not open"));
                }
                sink.action_execution_args(&tool_call_id, &tool_call_args);
            }
            AgentEvent::ToolCallEnd { tool_call_id, .. } => {
                if !self.open_tool_calls.remove(&tool_call_id) {
                    return self.violation(format!("tool call {tool_call_id} is not open"));
                }
                sink.action_execution_end(&tool_call_id);
                self.state = RunState::Finished;
            }
            AgentEvent::RunFinished { thread_id, .. } => {
                tracing::debug!("run finished for thread {}", thread_id);
                self.state = RunState::Finished;
            }
        }

        Ok(self.state)
    }

    fn violation(&mut self, detail: String) -> Result<RunState, BridgeError> {
        match self.options.violations {
            ViolationPolicy::Warn => {
                tracing::warn!("protocol violation, frame ignored: {}", detail);
                Ok(self.state)
            }
            ViolationPolicy::Fail => {
                self.state = RunState::Finished;
                Err(BridgeError::ProtocolViolation(detail))
            }
        }
    }
}
