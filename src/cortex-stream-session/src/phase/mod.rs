//! Phase timeline for a streaming turn.
//!
//! Phases are timestamped events, not deduplicated states: starting the
//! same phase twice opens two entries, which lets a phase recur across tool
//! iterations. Only the trailing entry may be open; every earlier entry is
//! closed when its successor starts.

use std::time::Duration;

use chrono::{DateTime, Utc};
use cortex_stream_protocol::PhaseId;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// One entry of the phase timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: PhaseId,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Phase {
    /// Returns `true` until the phase is superseded or the turn ends.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }

    /// Time spent in the phase, once it is closed.
    pub fn duration(&self) -> Option<Duration> {
        self.completed_at
            .map(|end| (end - self.started_at).to_std().unwrap_or_default())
    }
}

/// Append-only phase timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseTracker {
    current: Option<PhaseId>,
    history: Vec<Phase>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new phase at `now`, closing the previous trailing entry.
    pub fn start(&mut self, id: PhaseId, name: String, now: DateTime<Utc>) -> &Phase {
        self.finalize(now);
        self.current = Some(id.clone());
        self.history.push(Phase {
            id,
            name,
            started_at: now,
            completed_at: None,
        });
        &self.history[self.history.len() - 1]
    }

    /// Closes the trailing phase if it is still open.
    ///
    /// Returns `true` if a phase was closed. The current phase id is kept so
    /// a finished turn still reports where it ended.
    pub fn finalize(&mut self, now: DateTime<Utc>) -> bool {
        match self.history.last_mut() {
            Some(last) if last.is_open() => {
                last.completed_at = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Id of the most recently started phase.
    #[inline]
    pub fn current(&self) -> Option<&PhaseId> {
        self.current.as_ref()
    }

    /// The trailing timeline entry.
    pub fn current_phase(&self) -> Option<&Phase> {
        self.history.last()
    }

    /// Full timeline in start order.
    #[inline]
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Discards the timeline.
    pub fn clear(&mut self) {
        self.current = None;
        self.history.clear();
    }
}

/// Human label for a phase id that arrived without a name.
///
/// Well-known backend phases get a fixed label; anything else is the id
/// with separators turned into spaces and the first letter capitalized.
pub fn default_label(id: &PhaseId) -> String {
    let known = match id.as_str() {
        "routing" => Some("Routing"),
        "planning" => Some("Planning"),
        "thinking" | "reasoning" => Some("Thinking"),
        "retrieving" | "retrieval" => Some("Retrieving context"),
        "searching" | "search" => Some("Searching"),
        "tool_execution" | "executing_tool" | "executing_tools" => Some("Running tools"),
        "generating" | "generation" => Some("Generating response"),
        "finalizing" => Some("Finalizing"),
        _ => None,
    };
    if let Some(label) = known {
        return label.to_string();
    }

    let spaced: String = id
        .as_str()
        .trim()
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Working".to_string(),
    }
}
