//! Cortex Stream Session - State machine for one in-flight assistant turn.
//!
//! A [`StreamSession`] ingests the ordered event feed of a single turn and
//! keeps a consistent snapshot of what is happening right now:
//!
//! - [`PhaseTracker`] - timeline of execution phases, one current at a time
//! - [`TokenBuffer`] - ordered text fragments, concatenated on demand
//! - [`ToolCallRegistry`] - tool calls by id with a per-call lifecycle
//! - [`metrics`] - duration and throughput, recomputed on every read
//!
//! All four are driven through the session's operations, or through
//! [`StreamSession::handle_stream_event`] which maps each
//! [`StreamEvent`](cortex_stream_protocol::StreamEvent) onto exactly one of
//! them.
//!
//! # Example
//!
//! ```rust
//! use cortex_stream_protocol::{StreamEvent, ToolType};
//! use cortex_stream_session::StreamSession;
//!
//! let mut session = StreamSession::new();
//! session.start_stream();
//!
//! session.handle_stream_event(StreamEvent::phase_start("generating", None));
//! session.handle_stream_event(StreamEvent::token("Hel"));
//! session.handle_stream_event(StreamEvent::token("lo"));
//! session.handle_stream_event(StreamEvent::done());
//!
//! assert_eq!(session.content(), "Hello");
//! assert!(!session.is_streaming());
//! ```

pub mod buffer;
pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod phase;
pub mod session;
pub mod tool_call;

pub use buffer::TokenBuffer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use error::{ConfigError, Result, SessionError};
pub use metrics::StreamMetrics;
pub use phase::{Phase, PhaseTracker, default_label};
pub use session::{SessionSnapshot, StreamSession};
pub use tool_call::{
    ToolCall, ToolCallPatch, ToolCallRegistry, ToolCallStatus, ToolCallUpdate,
};

pub use cortex_stream_protocol as protocol;
