//! Stream events from the generation backend to the client.
//!
//! Events arrive as a `{type, data, timestamp}` envelope ([`RawStreamEvent`]).
//! Decoding into [`StreamEvent`] is the only place an envelope can be
//! rejected; once typed, an event is always dispatchable.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use strum_macros::Display;

use crate::error::{ProtocolError, Result};
use crate::ids::{PhaseId, ToolCallId};
use crate::tool::ToolType;

/// Tag of a stream event, as it appears in the envelope's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StreamEventKind {
    PhaseStart,
    Token,
    ToolCall,
    ToolResult,
    Error,
    Done,
}

impl StreamEventKind {
    /// Every kind in the vocabulary.
    pub const ALL: [StreamEventKind; 6] = [
        StreamEventKind::PhaseStart,
        StreamEventKind::Token,
        StreamEventKind::ToolCall,
        StreamEventKind::ToolResult,
        StreamEventKind::Error,
        StreamEventKind::Done,
    ];

    /// Wire tag for this kind.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::PhaseStart => "phase_start",
            Self::Token => "token",
            Self::ToolCall => "tool_call",
            Self::ToolResult => "tool_result",
            Self::Error => "error",
            Self::Done => "done",
        }
    }

    /// Resolve a wire tag. Returns `None` for tags outside the vocabulary.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_tag() == tag)
    }

    /// Returns `true` for kinds that terminate the turn.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error | Self::Done)
    }
}

// ============================================================
// Payloads
// ============================================================

/// A new execution phase started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseStartEvent {
    pub phase: PhaseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An incremental fragment of generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenEvent {
    pub content: String,
}

/// The backend initiated a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallEvent {
    pub id: ToolCallId,
    pub name: String,
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
}

/// A tool call finished. `error` is set when the tool failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultEvent {
    pub id: ToolCallId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The backend reported a failure for the whole turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub message: String,
}

#[derive(Serialize)]
struct EmptyData {}

/// Typed event payload, one variant per [`StreamEventKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEventPayload {
    PhaseStart(PhaseStartEvent),
    Token(TokenEvent),
    ToolCall(ToolCallEvent),
    ToolResult(ToolResultEvent),
    Error(ErrorEvent),
    Done,
}

impl StreamEventPayload {
    /// Tag of this payload.
    pub fn kind(&self) -> StreamEventKind {
        match self {
            Self::PhaseStart(_) => StreamEventKind::PhaseStart,
            Self::Token(_) => StreamEventKind::Token,
            Self::ToolCall(_) => StreamEventKind::ToolCall,
            Self::ToolResult(_) => StreamEventKind::ToolResult,
            Self::Error(_) => StreamEventKind::Error,
            Self::Done => StreamEventKind::Done,
        }
    }

    fn decode(kind: StreamEventKind, data: Value) -> Result<Self> {
        // `done{}` may arrive with no data at all.
        let data = match data {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };

        Ok(match kind {
            StreamEventKind::PhaseStart => Self::PhaseStart(decode_data(kind, data)?),
            StreamEventKind::Token => Self::Token(decode_data(kind, data)?),
            StreamEventKind::ToolCall => Self::ToolCall(decode_data(kind, data)?),
            StreamEventKind::ToolResult => Self::ToolResult(decode_data(kind, data)?),
            StreamEventKind::Error => Self::Error(decode_data(kind, data)?),
            StreamEventKind::Done => Self::Done,
        })
    }
}

fn decode_data<T: DeserializeOwned>(kind: StreamEventKind, data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|source| ProtocolError::MalformedPayload { kind, source })
}

// ============================================================
// Envelopes
// ============================================================

/// Wire envelope exactly as delivered by the transport.
///
/// `type` is kept as a plain string so unknown tags can be reported with
/// their original spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStreamEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawStreamEvent {
    /// Parse a single JSON envelope without validating its payload.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    /// Typed payload.
    pub payload: StreamEventPayload,
    /// When the backend emitted the event.
    pub timestamp: DateTime<Utc>,
}

impl StreamEvent {
    /// Create an event stamped with the current time.
    pub fn new(payload: StreamEventPayload) -> Self {
        Self {
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Replace the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Tag of this event.
    #[inline]
    pub fn kind(&self) -> StreamEventKind {
        self.payload.kind()
    }

    /// Decode an envelope from JSON, validating tag and payload.
    pub fn from_json(json: &str) -> Result<Self> {
        RawStreamEvent::from_json(json)?.try_into()
    }

    // --------------------------------------------------------
    // Constructors
    // --------------------------------------------------------

    pub fn phase_start(phase: impl Into<PhaseId>, name: Option<String>) -> Self {
        Self::new(StreamEventPayload::PhaseStart(PhaseStartEvent {
            phase: phase.into(),
            name,
        }))
    }

    pub fn token(content: impl Into<String>) -> Self {
        Self::new(StreamEventPayload::Token(TokenEvent {
            content: content.into(),
        }))
    }

    pub fn tool_call(
        id: impl Into<ToolCallId>,
        name: impl Into<String>,
        tool_type: ToolType,
        input: Option<Value>,
    ) -> Self {
        Self::new(StreamEventPayload::ToolCall(ToolCallEvent {
            id: id.into(),
            name: name.into(),
            tool_type,
            input,
        }))
    }

    pub fn tool_result(id: impl Into<ToolCallId>, output: Option<Value>) -> Self {
        Self::new(StreamEventPayload::ToolResult(ToolResultEvent {
            id: id.into(),
            output,
            error: None,
        }))
    }

    /// A `tool_result` reporting a failed tool.
    pub fn tool_failure(id: impl Into<ToolCallId>, error: impl Into<String>) -> Self {
        Self::new(StreamEventPayload::ToolResult(ToolResultEvent {
            id: id.into(),
            output: None,
            error: Some(error.into()),
        }))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StreamEventPayload::Error(ErrorEvent {
            message: message.into(),
        }))
    }

    pub fn done() -> Self {
        Self::new(StreamEventPayload::Done)
    }
}

impl TryFrom<RawStreamEvent> for StreamEvent {
    type Error = ProtocolError;

    fn try_from(raw: RawStreamEvent) -> Result<Self> {
        let kind = StreamEventKind::from_tag(&raw.event_type).ok_or_else(|| {
            ProtocolError::UnknownEventType {
                event_type: raw.event_type.clone(),
            }
        })?;

        Ok(Self {
            payload: StreamEventPayload::decode(kind, raw.data)?,
            timestamp: raw.timestamp.unwrap_or_else(Utc::now),
        })
    }
}

impl Serialize for StreamEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut envelope = serializer.serialize_struct("StreamEvent", 3)?;
        envelope.serialize_field("type", &self.kind())?;
        match &self.payload {
            StreamEventPayload::PhaseStart(data) => envelope.serialize_field("data", data)?,
            StreamEventPayload::Token(data) => envelope.serialize_field("data", data)?,
            StreamEventPayload::ToolCall(data) => envelope.serialize_field("data", data)?,
            StreamEventPayload::ToolResult(data) => envelope.serialize_field("data", data)?,
            StreamEventPayload::Error(data) => envelope.serialize_field("data", data)?,
            StreamEventPayload::Done => envelope.serialize_field("data", &EmptyData {})?,
        }
        envelope.serialize_field("timestamp", &self.timestamp)?;
        envelope.end()
    }
}

impl<'de> Deserialize<'de> for StreamEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawStreamEvent::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}
