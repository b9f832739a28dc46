//! Error types for event decoding.

use thiserror::Error;

use crate::event::StreamEventKind;

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while turning wire envelopes into typed events.
///
/// These are contract violations against the closed vocabulary. They are
/// surfaced to the caller instead of being dropped, since a skipped event
/// leaves the client out of sync with the backend's turn.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown stream event type: {event_type}")]
    UnknownEventType { event_type: String },

    #[error("Malformed {kind} event: {source}")]
    MalformedPayload {
        kind: StreamEventKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid event JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Returns the offending tag for unknown event types.
    pub fn unknown_event_type(&self) -> Option<&str> {
        match self {
            Self::UnknownEventType { event_type } => Some(event_type),
            _ => None,
        }
    }
}
