//! Run coordination
//!
//! One upstream connection and one translation pipeline per
//! chat-completion request. The coordinator performs the upstream
//! handshake, then spawns the pipeline pump and returns the resolved
//! thread id immediately; translation continues asynchronously until a
//! terminating event, end of stream, an upstream failure, or
//! cancellation. On every one of those paths the sink guard fires the
//! downstream completion signal exactly once.

use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use futures_util::StreamExt;
use uuid::Uuid;

use crate::error::BridgeError;
use crate::sink::{RuntimeSink, SinkGuard};
use crate::streaming::{EventTranslator, FrameDecoder, RunState, TranslatorOptions, parse_event};
use crate::types::{RunRequest, RunResponse};
use crate::utils::cancel::CancelHandle;

/// Configuration for a [`RunCoordinator`].
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Upstream agent endpoint receiving the forwarded POST.
    pub endpoint: String,

    /// Translator configuration applied to every run.
    pub translator: TranslatorOptions,

    /// Connect timeout for the HTTP client. Read timeouts stay with the
    /// transport; the pipeline reacts to whatever termination it signals.
    pub connect_timeout: Option<Duration>,
}

impl BridgeConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            translator: TranslatorOptions::default(),
            connect_timeout: None,
        }
    }

    pub fn with_translator(mut self, options: TranslatorOptions) -> Self {
        self.translator = options;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

/// Handle for a started run.
///
/// Returned as soon as the upstream handshake succeeds, while the
/// pipeline keeps pushing events to the sink in the background.
#[derive(Debug)]
pub struct RunHandle {
    /// The resolved conversation thread id (client-supplied or generated).
    pub thread_id: String,

    /// Cancels this run's pipeline; scoped to this run only.
    pub cancel: CancelHandle,

    /// Completes when the pipeline has terminated and the sink's
    /// completion signal has fired.
    pub pipeline: tokio::task::JoinHandle<()>,
}

impl RunHandle {
    /// The serializable response descriptor for this run.
    pub fn response(&self) -> RunResponse {
        RunResponse {
            thread_id: self.thread_id.clone(),
        }
    }
}

/// Owns the upstream HTTP client and starts translation runs.
#[derive(Debug, Clone)]
pub struct RunCoordinator {
    client: reqwest::Client,
    config: BridgeConfig,
}

impl RunCoordinator {
    /// Build a coordinator with its own HTTP client.
    pub fn new(config: BridgeConfig) -> Result<Self, BridgeError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BridgeError::HttpError(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Build a coordinator around an existing HTTP client.
    pub fn with_client(config: BridgeConfig, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    /// Start one run: forward `request` upstream, wire the translation
    /// pipeline to `sink`, and return the thread id without awaiting the
    /// translation.
    ///
    /// A send failure or non-2xx status is returned as an error; the
    /// sink's `complete()` has fired by then, so the consumer never waits
    /// for events that cannot come.
    pub async fn start<S>(&self, request: RunRequest, sink: S) -> Result<RunHandle, BridgeError>
    where
        S: RuntimeSink + 'static,
    {
        let thread_id = request
            .thread_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // The guard owns the sink from here on: every exit path below,
        // error or not, releases it with exactly one complete() call.
        let guard = SinkGuard::new(sink);

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(BridgeError::ApiError { status, message });
        }

        tracing::debug!("run {}: upstream connected", thread_id);

        let cancel = CancelHandle::new();
        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|err| BridgeError::StreamError(err.to_string())))
            .boxed();
        let pipeline = tokio::spawn(drive(
            chunks,
            EventTranslator::new(self.config.translator.clone()),
            guard,
            cancel.clone(),
            thread_id.clone(),
        ));

        Ok(RunHandle {
            thread_id,
            cancel,
            pipeline,
        })
    }
}

/// The pipeline pump: read chunks until a terminating event, end of
/// stream, a stream failure, or cancellation, whichever comes first.
/// Frames already buffered past a terminator are not processed.
async fn drive<St, S>(
    mut chunks: St,
    mut translator: EventTranslator,
    mut guard: SinkGuard<S>,
    cancel: CancelHandle,
    thread_id: String,
) where
    St: Stream<Item = Result<Bytes, BridgeError>> + Unpin,
    S: RuntimeSink,
{
    let mut decoder = FrameDecoder::new();
    'read: loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("run {}: cancelled", thread_id);
                break 'read;
            }
            next = chunks.next() => next,
        };
        let chunk = match next {
            Some(Ok(chunk)) => chunk,
            Some(Err(err)) => {
                tracing::error!("run {}: upstream stream failed: {}", thread_id, err);
                break 'read;
            }
            None => break 'read,
        };

        for payload in decoder.feed(&chunk) {
            match parse_event(&payload) {
                Ok(event) => match translator.apply(event, guard.sink_mut()) {
                    Ok(RunState::Running) => {}
                    Ok(RunState::Finished) => break 'read,
                    Err(err) => {
                        tracing::error!("run {}: {}", thread_id, err);
                        break 'read;
                    }
                },
                Err(err) => {
                    tracing::warn!("run {}: skipping frame: {}", thread_id, err);
                }
            }
        }
    }

    if !decoder.remainder().is_empty() {
        tracing::debug!(
            "run {}: discarding {} bytes of incomplete trailing data",
            thread_id,
            decoder.remainder().len()
        );
    }
    tracing::debug!("run {}: pipeline finished", thread_id);
    // Dropping the guard fires the sink's completion signal.
}
