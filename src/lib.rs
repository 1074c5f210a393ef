//! agui-bridge
//!
//! Streaming bridge from an AG-UI style agent event stream to a
//! chat-runtime event sink.
//!
//! The bridge opens one upstream connection per chat-completion request,
//! re-frames the newline-delimited `data:` byte stream into typed agent
//! events, and translates them, in upstream order and with identifier
//! continuity enforced, into calls on a [`RuntimeSink`]. The sink's
//! `complete()` is guaranteed to fire exactly once per run, on every exit
//! path.
//!
//! # Architecture
//!
//! - [`streaming::FrameDecoder`]: reassembles `data:` frames from raw
//!   byte chunks, tolerating chunk boundaries that split a frame.
//! - [`streaming::parse_event`]: maps a frame payload to a typed
//!   [`AgentEvent`]; unrecognized payloads are skipped, not fatal.
//! - [`streaming::EventTranslator`]: the per-run state machine that
//!   emits downstream sink calls and decides when the run is finished.
//! - [`run::RunCoordinator`]: owns the upstream request, the per-run
//!   cancellation handle, and the pipeline task.
//!
//! # Example
//!
//! ```rust,no_run
//! use agui_bridge::{BridgeConfig, RunCoordinator, RunRequest, RuntimeSink};
//!
//! struct PrintSink;
//!
//! impl RuntimeSink for PrintSink {
//!     fn text_message_start(&mut self, message_id: &str) {
//!         println!("message {message_id} started");
//!     }
//!     fn text_message_content(&mut self, _message_id: &str, delta: &str) {
//!         print!("{delta}");
//!     }
//!     fn text_message_end(&mut self, _message_id: &str) {
//!         println!();
//!     }
//!     fn action_execution_start(&mut self, _id: &str, name: &str, _parent: Option<&str>) {
//!         println!("running action {name}");
//!     }
//!     fn action_execution_args(&mut self, _id: &str, _args: &str) {}
//!     fn action_execution_end(&mut self, _id: &str) {}
//!     fn complete(&mut self) {
//!         println!("run complete");
//!     }
//! }
//!
//! # async fn example() -> Result<(), agui_bridge::BridgeError> {
//! let coordinator = RunCoordinator::new(BridgeConfig::new("http://localhost:8080/agent/run"))?;
//! let handle = coordinator.start(RunRequest::new(), PrintSink).await?;
//! println!("thread: {}", handle.thread_id);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod run;
pub mod sink;
pub mod streaming;
pub mod types;
pub mod utils;

pub use error::BridgeError;
pub use run::{BridgeConfig, RunCoordinator, RunHandle};
pub use sink::RuntimeSink;
pub use streaming::{EventTranslator, FrameDecoder, RunState, TranslatorOptions, ViolationPolicy};
pub use types::{AgentEvent, Role, RunRequest, RunResponse};
