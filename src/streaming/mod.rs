//! Streaming Module
//!
//! The translation pipeline stages, leaves first:
//! - Frame decoding: raw byte chunks → `data:` frame payloads
//! - Event parsing: frame payload → typed [`AgentEvent`](crate::types::AgentEvent)
//! - Translation: upstream events → downstream sink calls

mod decoder;
mod parser;
mod translator;

pub use decoder::FrameDecoder;
pub use parser::{ParseError, parse_event};
pub use translator::{EventTranslator, RunState, TranslatorOptions, ViolationPolicy};
