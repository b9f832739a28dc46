//! Session façade for one in-flight assistant turn.
//!
//! [`StreamSession`] owns the phase timeline, token buffer and tool call
//! registry of a single turn and is the only way to mutate them. Every
//! operation is synchronous and leaves the session consistent; callers that
//! share a session across threads must serialize access themselves.
//!
//! # Lifecycle
//!
//! ```text
//! empty ──start_stream──► streaming ◄──resume── paused
//!                            │  └─────pause────►  │
//!                            ├──end_stream───► ended
//!                            └──set_error────► ended (with error)
//! ```
//!
//! `reset` returns any state to empty. Operations are not gated on the
//! lifecycle: feeding a session that was never started still records data.

mod dispatch;
mod snapshot;


use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cortex_stream_protocol::{PhaseId, ToolCallId};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::buffer::TokenBuffer;
use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::metrics::{self, StreamMetrics};
use crate::phase::{Phase, PhaseTracker};
use crate::tool_call::{ToolCall, ToolCallPatch, ToolCallRegistry, ToolCallUpdate};

pub use snapshot::SessionSnapshot;

/// Mutable state of a turn. `Default` is the empty session.
#[derive(Debug, Clone, Default, PartialEq)]
struct SessionState {
    is_streaming: bool,
    is_paused: bool,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    phases: PhaseTracker,
    buffer: TokenBuffer,
    tools: ToolCallRegistry,
    error: Option<String>,
}

/// State machine tracking a single streaming assistant turn.
#[derive(Debug, Clone)]
pub struct StreamSession {
    state: SessionState,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
}

impl StreamSession {
    /// Creates an empty session using the system clock and default config.
    pub fn new() -> Self {
        Self::with_parts(SessionConfig::default(), Arc::new(SystemClock))
    }

    /// Creates an empty session from explicit parts.
    pub fn with_parts(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: SessionState::default(),
            clock,
            config,
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // --------------------------------------------------------
    // Lifecycle
    // --------------------------------------------------------

    /// Begins a turn.
    ///
    /// Clears tokens, tool calls, phases and any previous error or end time,
    /// then stamps the start time.
    pub fn start_stream(&mut self) {
        let now = self.now();
        let state = &mut self.state;
        state.buffer.clear();
        state.tools.clear();
        state.phases.clear();
        state.error = None;
        state.end_time = None;
        state.is_streaming = true;
        state.is_paused = false;
        state.start_time = Some(now);
        debug!(started_at = %now, "Stream started");
    }

    /// Pauses token ingestion.
    ///
    /// Only text is discarded while paused; phase and tool call events keep
    /// applying. Has no effect unless the stream is running.
    pub fn pause_stream(&mut self) {
        if !self.state.is_streaming {
            debug!("Ignoring pause: stream is not running");
            return;
        }
        self.state.is_paused = true;
        debug!(token_count = self.state.buffer.token_count(), "Stream paused");
    }

    /// Resumes token ingestion.
    pub fn resume_stream(&mut self) {
        if self.state.is_paused {
            debug!("Stream resumed");
        }
        self.state.is_paused = false;
    }

    /// Ends the turn normally.
    ///
    /// Stamps the end time and closes the open phase. A session that already
    /// ended is left untouched.
    pub fn end_stream(&mut self) {
        if self.state.end_time.is_some() {
            debug!("Ignoring end: stream already ended");
            return;
        }
        let now = self.now();
        self.terminate(now);
        debug!(
            token_count = self.state.buffer.token_count(),
            tool_calls = self.state.tools.len(),
            "Stream ended"
        );
    }

    /// Ends the turn with an upstream failure.
    ///
    /// Same effects as [`StreamSession::end_stream`] plus recording `message`.
    /// On a session that already ended the message replaces the previous one
    /// and the original end time is kept.
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        let now = self.now();

        if let Some(previous) = &self.state.error {
            debug!(previous = %previous, "Replacing stream error");
        }
        warn!(error = %message, "Stream failed");

        self.state.error = Some(message);
        if self.state.end_time.is_some() {
            self.state.is_streaming = false;
            self.state.is_paused = false;
            self.state.phases.finalize(now);
        } else {
            self.terminate(now);
        }
    }

    fn terminate(&mut self, now: DateTime<Utc>) {
        let state = &mut self.state;
        state.is_streaming = false;
        state.is_paused = false;
        state.end_time = Some(now);
        state.phases.finalize(now);
    }

    /// Returns the session to its empty state, discarding all history.
    pub fn reset(&mut self) {
        self.state = SessionState::default();
        debug!("Stream session reset");
    }

    // --------------------------------------------------------
    // Phases
    // --------------------------------------------------------

    /// Starts a phase, closing the previous one.
    ///
    /// Without a `name`, the configured or built-in label for `id` is used.
    /// Starting the current phase again opens a new timeline entry.
    pub fn set_phase(&mut self, id: impl Into<PhaseId>, name: Option<String>) {
        let id = id.into();
        let name = name.unwrap_or_else(|| self.config.phase_label(&id));
        let now = self.now();
        let phase = self.state.phases.start(id, name, now);
        debug!(phase = %phase.id, name = %phase.name, "Phase started");
    }

    // --------------------------------------------------------
    // Tokens
    // --------------------------------------------------------

    /// Appends one text fragment. Returns `false` if the stream is paused and
    /// the fragment was dropped.
    pub fn add_token(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if self.state.is_paused {
            trace!(len = token.len(), "Dropping token while paused");
            return false;
        }
        let now = self.now();
        trace!(len = token.len(), "Token received");
        self.state.buffer.push(token, now);
        true
    }

    /// Appends fragments in order. Returns how many were appended (zero
    /// while paused).
    pub fn add_tokens<I, S>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.state.is_paused {
            trace!("Dropping token batch while paused");
            return 0;
        }
        let now = self.now();
        let appended = self
            .state
            .buffer
            .extend(tokens.into_iter().map(Into::into), now);
        trace!(appended, "Token batch received");
        appended
    }

    // --------------------------------------------------------
    // Tool calls
    // --------------------------------------------------------

    /// Registers a tool call and makes it the active one.
    pub fn add_tool_call(&mut self, call: ToolCall) {
        let now = self.now();
        self.state.tools.add(call, now);
    }

    /// Merges `patch` into the call with `id`, enforcing the status
    /// lifecycle.
    pub fn update_tool_call(&mut self, id: &str, patch: ToolCallPatch) -> ToolCallUpdate {
        let now = self.now();
        self.state.tools.update(id, patch, now)
    }

    /// Finishes the call with `id`, as failed when `error` is set.
    ///
    /// Returns `false` for unknown or already finished calls.
    pub fn complete_tool_call(
        &mut self,
        id: &str,
        output: Option<Value>,
        error: Option<String>,
    ) -> bool {
        let now = self.now();
        self.state.tools.complete(id, output, error, now)
    }

    // --------------------------------------------------------
    // Read-only projection
    // --------------------------------------------------------

    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.state.is_streaming
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state.is_paused
    }

    /// Returns `true` once the turn ended, normally or with an error.
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.state.end_time.is_some()
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.state.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.state.end_time
    }

    pub fn current_phase(&self) -> Option<&PhaseId> {
        self.state.phases.current()
    }

    pub fn phase_history(&self) -> &[Phase] {
        self.state.phases.history()
    }

    pub fn tokens(&self) -> &[String] {
        self.state.buffer.tokens()
    }

    pub fn token_count(&self) -> usize {
        self.state.buffer.token_count()
    }

    pub fn bytes_received(&self) -> usize {
        self.state.buffer.bytes_received()
    }

    /// Full response text, rebuilt from the buffer on every call.
    pub fn content(&self) -> String {
        self.state.buffer.content()
    }

    /// Tool calls in registration order.
    pub fn tool_calls(&self) -> impl ExactSizeIterator<Item = &ToolCall> {
        self.state.tools.iter()
    }

    pub fn tool_call(&self, id: &str) -> Option<&ToolCall> {
        self.state.tools.get(id)
    }

    /// Most recently registered call that has not finished, unless it was
    /// cleared by finishing.
    pub fn active_tool_id(&self) -> Option<&ToolCallId> {
        self.state.tools.active_id()
    }

    pub fn active_tool_call(&self) -> Option<&ToolCall> {
        self.state.tools.active()
    }

    /// Every unfinished call, in registration order.
    pub fn outstanding_tool_ids(&self) -> Vec<&ToolCallId> {
        self.state.tools.outstanding_ids()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // --------------------------------------------------------
    // Metrics
    // --------------------------------------------------------

    /// Time since start, up to the end time once ended. Zero before start.
    pub fn duration(&self) -> Duration {
        metrics::duration(self.state.start_time, self.state.end_time, self.now())
    }

    /// Fragments per second over [`StreamSession::duration`]; always finite.
    pub fn tokens_per_second(&self) -> f64 {
        metrics::tokens_per_second(
            self.state.buffer.token_count(),
            self.duration(),
            self.config.throughput_epsilon(),
        )
    }

    pub fn time_to_first_token(&self) -> Option<Duration> {
        metrics::time_to_first_token(self.state.start_time, self.state.buffer.first_token_at())
    }

    /// All metrics computed at a single instant.
    pub fn metrics(&self) -> StreamMetrics {
        StreamMetrics::compute(
            self.state.start_time,
            self.state.end_time,
            &self.state.buffer,
            self.now(),
            self.config.throughput_epsilon(),
        )
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}
