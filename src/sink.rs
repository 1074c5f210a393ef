//! Downstream chat-runtime event sink
//!
//! The consuming chat runtime is modeled as a sink of typed event calls.
//! The translator invokes the six event methods strictly in upstream
//! decode order; `complete()` is the completion signal guaranteeing no
//! further events will follow, and fires exactly once per run via
//! [`SinkGuard`].

/// Receiver for the translated event stream of one run.
pub trait RuntimeSink: Send {
    /// A text message with the given id opens.
    fn text_message_start(&mut self, message_id: &str);

    /// A chunk of text for an open message.
    fn text_message_content(&mut self, message_id: &str, delta: &str);

    /// An open text message closes.
    fn text_message_end(&mut self, message_id: &str);

    /// An action (tool call) execution opens.
    fn action_execution_start(
        &mut self,
        action_id: &str,
        action_name: &str,
        parent_message_id: Option<&str>,
    );

    /// A chunk of arguments for an open action execution.
    fn action_execution_args(&mut self, action_id: &str, args: &str);

    /// An open action execution closes.
    fn action_execution_end(&mut self, action_id: &str);

    /// No further events will be produced for this run.
    fn complete(&mut self);
}

/// Owns a [`RuntimeSink`] for the duration of a run and fires its
/// `complete()` exactly once when dropped, whichever way the pipeline
/// exits (normal termination, upstream failure, cancellation, panic
/// unwind).
#[derive(Debug)]
pub struct SinkGuard<S: RuntimeSink> {
    sink: Option<S>,
}

impl<S: RuntimeSink> SinkGuard<S> {
    /// Take ownership of the sink for one run.
    pub fn new(sink: S) -> Self {
        Self { sink: Some(sink) }
    }

    /// The guarded sink, for emitting events.
    pub fn sink_mut(&mut self) -> &mut S {
        self.sink.as_mut().expect("sink present until drop")
    }
}

impl<S: RuntimeSink> Drop for SinkGuard<S> {
    fn drop(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            sink.complete();
        }
    }
}
