//! Event dispatcher: maps each stream event onto one session operation.

use cortex_stream_protocol::{
    ErrorEvent, PhaseStartEvent, RawStreamEvent, StreamEvent, StreamEventPayload, TokenEvent,
    ToolResultEvent,
};
use tracing::trace;

use super::StreamSession;
use crate::error::Result;
use crate::tool_call::ToolCall;

impl StreamSession {
    /// Applies one decoded event.
    ///
    /// The match is exhaustive over the event vocabulary and every arm calls
    /// exactly one session operation, so each event kind has a single
    /// handler. Events must be applied in delivery order.
    pub fn handle_stream_event(&mut self, event: StreamEvent) {
        trace!(kind = %event.kind(), timestamp = %event.timestamp, "Handling stream event");

        match event.payload {
            StreamEventPayload::PhaseStart(PhaseStartEvent { phase, name }) => {
                self.set_phase(phase, name);
            }
            StreamEventPayload::Token(TokenEvent { content }) => {
                self.add_token(content);
            }
            StreamEventPayload::ToolCall(call) => {
                self.add_tool_call(ToolCall::from(call));
            }
            StreamEventPayload::ToolResult(ToolResultEvent { id, output, error }) => {
                self.complete_tool_call(id.as_str(), output, error);
            }
            StreamEventPayload::Error(ErrorEvent { message }) => {
                self.set_error(message);
            }
            StreamEventPayload::Done => {
                self.end_stream();
            }
        }
    }

    /// Decodes a wire envelope and applies it.
    ///
    /// Unknown or malformed events are returned as errors and leave the
    /// session unchanged.
    pub fn handle_raw_event(&mut self, raw: RawStreamEvent) -> Result<()> {
        let event = StreamEvent::try_from(raw)?;
        self.handle_stream_event(event);
        Ok(())
    }

    /// Decodes a JSON envelope and applies it.
    pub fn handle_json_event(&mut self, json: &str) -> Result<()> {
        let event = StreamEvent::from_json(json)?;
        self.handle_stream_event(event);
        Ok(())
    }
}
