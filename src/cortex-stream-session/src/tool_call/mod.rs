//! Tool calls made by the backend during a turn.
//!
//! [`ToolCallRegistry`] keeps calls in insertion order with constant-time
//! lookup by id, and tracks which call is "active": the most recently added
//! one that is still outstanding.

mod registry;
mod status;


use std::time::Duration;

use chrono::{DateTime, Utc};
use cortex_stream_protocol::{ToolCallEvent, ToolCallId, ToolType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use registry::ToolCallRegistry;
pub use status::ToolCallStatus;

/// Record of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: ToolCallId,
    pub name: String,
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub status: ToolCallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stamped when the call is registered, unless the caller set it.
    pub started_at: Option<DateTime<Utc>>,
    /// Stamped when the call reaches a terminal status.
    pub completed_at: Option<DateTime<Utc>>,
}

impl ToolCall {
    /// Creates a pending call.
    pub fn new(id: impl Into<ToolCallId>, name: impl Into<String>, tool_type: ToolType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tool_type,
            status: ToolCallStatus::Pending,
            input: None,
            output: None,
            error: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn with_status(mut self, status: ToolCallStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Wall time from start to completion, once both are known.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).to_std().unwrap_or_default()),
            _ => None,
        }
    }
}

impl From<ToolCallEvent> for ToolCall {
    fn from(event: ToolCallEvent) -> Self {
        Self {
            input: event.input,
            ..Self::new(event.id, event.name, event.tool_type)
        }
    }
}

/// Partial update merged into an existing [`ToolCall`].
///
/// Unset fields leave the record untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallPatch {
    pub name: Option<String>,
    pub tool_type: Option<ToolType>,
    pub status: Option<ToolCallStatus>,
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub error: Option<String>,
}

impl ToolCallPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: ToolCallStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn tool_type(mut self, tool_type: ToolType) -> Self {
        self.tool_type = Some(tool_type);
        self
    }

    pub fn input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Outcome of [`ToolCallRegistry::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallUpdate {
    /// The patch was merged.
    Applied,
    /// No call with that id exists.
    UnknownId,
    /// The patch asked for a status change the lifecycle forbids; nothing
    /// was changed.
    RejectedTransition {
        from: ToolCallStatus,
        to: ToolCallStatus,
    },
}

impl ToolCallUpdate {
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
