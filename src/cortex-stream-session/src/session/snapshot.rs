//! Serializable read-only view of a session.

use chrono::{DateTime, Utc};
use cortex_stream_protocol::{PROTOCOL_VERSION, PhaseId, ToolCallId};
use serde::{Deserialize, Serialize};

use super::StreamSession;
use crate::metrics::StreamMetrics;
use crate::phase::Phase;
use crate::tool_call::ToolCall;

/// Everything a renderer needs to draw the current turn.
///
/// Taken at one instant; it does not follow later mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Event vocabulary version the session was fed with.
    pub protocol_version: u32,
    pub is_streaming: bool,
    pub is_paused: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub current_phase: Option<PhaseId>,
    pub phase_history: Vec<Phase>,
    pub tokens: Vec<String>,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub active_tool_id: Option<ToolCallId>,
    pub outstanding_tool_ids: Vec<ToolCallId>,
    pub error: Option<String>,
    pub metrics: StreamMetrics,
}

impl SessionSnapshot {
    /// Tool call by id.
    pub fn tool_call(&self, id: &str) -> Option<&ToolCall> {
        self.tool_calls.iter().find(|call| call.id == id)
    }

    /// The phase the turn is in (or ended in).
    pub fn current_phase_entry(&self) -> Option<&Phase> {
        self.phase_history.last()
    }
}

impl StreamSession {
    /// Captures the session's current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            protocol_version: PROTOCOL_VERSION,
            is_streaming: self.is_streaming(),
            is_paused: self.is_paused(),
            start_time: self.start_time(),
            end_time: self.end_time(),
            current_phase: self.current_phase().cloned(),
            phase_history: self.phase_history().to_vec(),
            tokens: self.tokens().to_vec(),
            content: self.content(),
            tool_calls: self.tool_calls().cloned().collect(),
            active_tool_id: self.active_tool_id().cloned(),
            outstanding_tool_ids: self
                .outstanding_tool_ids()
                .into_iter()
                .cloned()
                .collect(),
            error: self.error().map(str::to_string),
            metrics: self.metrics(),
        }
    }
}
