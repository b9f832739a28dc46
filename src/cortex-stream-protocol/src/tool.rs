//! Tool categories reported by `tool_call` events.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Category of external capability a tool call invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToolType {
    /// Web browsing / page fetch.
    Browser,
    /// Search engine or index lookup.
    Search,
    /// Code execution.
    Code,
    /// File system access.
    File,
    /// Anything else the backend exposes.
    Custom,
}

impl ToolType {
    /// All tool types, in declaration order.
    pub const ALL: [ToolType; 5] = [
        ToolType::Browser,
        ToolType::Search,
        ToolType::Code,
        ToolType::File,
        ToolType::Custom,
    ];
}
