//! Cortex Stream Protocol - Event vocabulary for streaming assistant turns
//!
//! This crate defines the closed set of events a generation backend emits
//! while an assistant turn is in flight: phase markers, text tokens, tool-call
//! lifecycle events, errors and completion. Every event travels as a
//! `{type, data, timestamp}` envelope and is decoded into the typed
//! [`StreamEvent`] before it reaches a session.
//!
//! The vocabulary is versioned by [`PROTOCOL_VERSION`]. Adding a kind means
//! extending [`StreamEventKind`], [`StreamEventPayload`] and every dispatcher
//! that matches on them.

pub mod error;
pub mod event;
pub mod ids;
pub mod tool;

#[cfg(test)]
mod tests;

// Re-exports
pub use error::{ProtocolError, Result};
pub use event::{
    ErrorEvent, PhaseStartEvent, RawStreamEvent, StreamEvent, StreamEventKind, StreamEventPayload,
    TokenEvent, ToolCallEvent, ToolResultEvent,
};
pub use ids::{PhaseId, ToolCallId};
pub use tool::ToolType;

/// Version of the event vocabulary understood by this crate.
pub const PROTOCOL_VERSION: u32 = 1;
