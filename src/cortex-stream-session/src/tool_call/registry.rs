//! Ordered registry of tool calls.

use chrono::{DateTime, Utc};
use cortex_stream_protocol::ToolCallId;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ToolCall, ToolCallPatch, ToolCallStatus, ToolCallUpdate};

/// Tool calls of one turn, in the order they were registered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallRegistry {
    calls: IndexMap<ToolCallId, ToolCall>,
    active: Option<ToolCallId>,
}

impl ToolCallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a call and makes it the active one.
    ///
    /// The active id always follows the most recent registration, even when
    /// earlier calls are still outstanding. A call registered directly in a
    /// terminal status is stored but does not become active.
    ///
    /// Reusing an id replaces the earlier record in place. If the replacement
    /// is already terminal and the earlier record was active, the active slot
    /// is released.
    pub fn add(&mut self, mut call: ToolCall, now: DateTime<Utc>) {
        if call.started_at.is_none() {
            call.started_at = Some(now);
        }
        if call.status.is_terminal() {
            if call.completed_at.is_none() {
                call.completed_at = Some(now);
            }
            self.release_active(call.id.as_str());
        } else {
            self.active = Some(call.id.clone());
        }

        debug!(
            tool_call_id = %call.id,
            tool = %call.name,
            tool_type = %call.tool_type,
            status = %call.status,
            "Tool call registered"
        );

        if let Some(previous) = self.calls.insert(call.id.clone(), call) {
            warn!(
                tool_call_id = %previous.id,
                previous_status = %previous.status,
                "Tool call id reused; replacing earlier record"
            );
        }
    }

    /// Merges `patch` into the call with `id`.
    ///
    /// A status change is checked against the lifecycle first; a forbidden
    /// transition rejects the whole patch. Reaching a terminal status here
    /// has the same effect as [`ToolCallRegistry::complete`]: the completion
    /// time is stamped and the call stops being active.
    pub fn update(&mut self, id: &str, patch: ToolCallPatch, now: DateTime<Utc>) -> ToolCallUpdate {
        let Some(call) = self.calls.get_mut(id) else {
            warn!(tool_call_id = id, "Ignoring update for unknown tool call");
            return ToolCallUpdate::UnknownId;
        };

        if let Some(next) = patch.status {
            if !call.status.can_transition_to(next) {
                warn!(
                    tool_call_id = id,
                    from = %call.status,
                    to = %next,
                    "Rejected tool call status transition"
                );
                return ToolCallUpdate::RejectedTransition {
                    from: call.status,
                    to: next,
                };
            }
        }

        let was_terminal = call.status.is_terminal();
        let ToolCallPatch {
            name,
            tool_type,
            status,
            input,
            output,
            error,
        } = patch;

        if let Some(name) = name {
            call.name = name;
        }
        if let Some(tool_type) = tool_type {
            call.tool_type = tool_type;
        }
        if let Some(status) = status {
            call.status = status;
        }
        if input.is_some() {
            call.input = input;
        }
        if output.is_some() {
            call.output = output;
        }
        if error.is_some() {
            call.error = error;
        }

        if !was_terminal && call.status.is_terminal() {
            call.completed_at = Some(now);
            self.release_active(id);
        }

        ToolCallUpdate::Applied
    }

    /// Finishes the call with `id`: `failed` when `error` is set and
    /// non-empty, otherwise `completed`.
    ///
    /// Returns `false` if the id is unknown or the call already finished.
    pub fn complete(
        &mut self,
        id: &str,
        output: Option<Value>,
        error: Option<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(call) = self.calls.get_mut(id) else {
            warn!(tool_call_id = id, "Ignoring result for unknown tool call");
            return false;
        };
        if call.is_terminal() {
            debug!(
                tool_call_id = id,
                status = %call.status,
                "Ignoring result for finished tool call"
            );
            return false;
        }

        let error = error.filter(|message| !message.is_empty());
        call.status = if error.is_some() {
            ToolCallStatus::Failed
        } else {
            ToolCallStatus::Completed
        };
        call.completed_at = Some(now);
        if output.is_some() {
            call.output = output;
        }
        if error.is_some() {
            call.error = error;
        }

        debug!(tool_call_id = id, status = %call.status, "Tool call finished");
        self.release_active(id);
        true
    }

    /// Clears the active id if it points at `id`. Other outstanding calls
    /// are not promoted.
    fn release_active(&mut self, id: &str) {
        if self.active.as_ref().is_some_and(|active| active == id) {
            self.active = None;
        }
    }

    // --------------------------------------------------------
    // Accessors
    // --------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<&ToolCall> {
        self.calls.get(id)
    }

    /// Calls in registration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ToolCall> {
        self.calls.values()
    }

    #[inline]
    pub fn active_id(&self) -> Option<&ToolCallId> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&ToolCall> {
        self.active.as_ref().and_then(|id| self.calls.get(id))
    }

    /// Ids of every call not yet finished, in registration order.
    pub fn outstanding_ids(&self) -> Vec<&ToolCallId> {
        self.calls
            .values()
            .filter(|call| !call.is_terminal())
            .map(|call| &call.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.active = None;
    }
}
