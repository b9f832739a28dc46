//! Tool call lifecycle states and their transition table.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Lifecycle of a single tool call.
///
/// ```text
/// pending ──► executing ──► completed
///    │            │
///    └────────────┴───────► failed
/// ```
///
/// `completed` and `failed` are sinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolCallStatus {
    #[default]
    Pending,
    Executing,
    Completed,
    Failed,
}

impl ToolCallStatus {
    /// Returns `true` for `completed` and `failed`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether the call may move from `self` to `next`.
    ///
    /// Staying in a non-terminal state is allowed so repeated progress
    /// updates are harmless.
    pub fn can_transition_to(&self, next: ToolCallStatus) -> bool {
        use ToolCallStatus::*;
        match (self, next) {
            (Pending, Pending | Executing | Completed | Failed) => true,
            (Executing, Executing | Completed | Failed) => true,
            (Executing, Pending) => false,
            (Completed | Failed, _) => false,
        }
    }
}
