//! Line-by-line replay of an event log.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use cortex_stream_protocol::{RawStreamEvent, StreamEvent};
use cortex_stream_session::{ManualClock, SessionConfig, SessionSnapshot, StreamSession};
use tracing::{debug, info};

/// Replay behavior.
#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    /// Call `start_stream` before the first event.
    pub auto_start: bool,
    /// Set the session clock to each event's timestamp before applying it.
    pub event_time: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            auto_start: true,
            event_time: false,
        }
    }
}

/// Result of a finished replay.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub events_applied: usize,
    pub snapshot: SessionSnapshot,
}

/// Feeds decoded events into a session.
#[derive(Debug)]
pub struct Replayer {
    session: StreamSession,
    clock: Option<ManualClock>,
    options: ReplayOptions,
    started: bool,
    events_applied: usize,
}

impl Replayer {
    pub fn new(config: SessionConfig, options: ReplayOptions) -> Self {
        let mut session = StreamSession::new().with_config(config);
        let clock = options.event_time.then(ManualClock::default);
        if let Some(clock) = &clock {
            session = session.with_clock(Arc::new(clock.clone()));
        }

        Self {
            session,
            clock,
            options,
            started: false,
            events_applied: 0,
        }
    }

    /// Decodes and applies one line. Blank lines are skipped.
    ///
    /// `line_no` is 1-based and only used for error context.
    pub fn feed_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let raw = RawStreamEvent::from_json(line)
            .with_context(|| format!("Invalid stream event on line {line_no}"))?;
        let recorded_at = raw.timestamp;
        let event = StreamEvent::try_from(raw)
            .with_context(|| format!("Invalid stream event on line {line_no}"))?;
        self.dispatch(event, recorded_at);
        Ok(())
    }

    /// Applies one decoded event.
    pub fn apply(&mut self, event: StreamEvent) {
        let recorded_at = event.timestamp;
        self.dispatch(event, Some(recorded_at));
    }

    /// In event-time mode the clock follows `recorded_at`. Events without a
    /// recorded timestamp leave the clock where it is.
    fn dispatch(&mut self, event: StreamEvent, recorded_at: Option<DateTime<Utc>>) {
        if let (Some(clock), Some(recorded_at)) = (&self.clock, recorded_at) {
            clock.set(recorded_at);
        }
        if self.options.auto_start && !self.started {
            self.session.start_stream();
        }
        self.started = true;

        debug!(kind = %event.kind(), index = self.events_applied, "Replaying event");
        self.session.handle_stream_event(event);
        self.events_applied += 1;
    }

    /// Replays every line of `reader`.
    pub fn run<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.with_context(|| format!("Failed to read line {line_no}"))?;
            self.feed_line(line_no, &line)?;
        }
        info!(events = self.events_applied, "Replay finished");
        Ok(())
    }

    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    pub fn finish(self) -> ReplayReport {
        ReplayReport {
            events_applied: self.events_applied,
            snapshot: self.session.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_stream_session::ToolCallStatus;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const LOG: &str = r#"{"type":"phase_start","data":{"phase":"generating"},"timestamp":"2025-03-01T10:00:00Z"}
{"type":"token","data":{"content":"Hel"},"timestamp":"2025-03-01T10:00:00.500Z"}

{"type":"token","data":{"content":"lo"},"timestamp":"2025-03-01T10:00:01Z"}
{"type":"tool_call","data":{"id":"s1","name":"search","type":"search"},"timestamp":"2025-03-01T10:00:01Z"}
{"type":"tool_result","data":{"id":"s1","output":{"n":1}},"timestamp":"2025-03-01T10:00:01.500Z"}
{"type":"done","data":{},"timestamp":"2025-03-01T10:00:02Z"}
"#;

    #[test]
    fn test_replay_log() {
        let mut replayer = Replayer::new(SessionConfig::default(), ReplayOptions::default());
        replayer.run(LOG.as_bytes()).expect("replay");

        let report = replayer.finish();
        assert_eq!(report.events_applied, 6);
        assert_eq!(report.snapshot.content, "Hello");
        assert!(!report.snapshot.is_streaming);
        assert_eq!(
            report.snapshot.tool_call("s1").map(|call| call.status),
            Some(ToolCallStatus::Completed)
        );
    }

    #[test]
    fn test_replay_with_event_time() {
        let options = ReplayOptions {
            event_time: true,
            ..ReplayOptions::default()
        };
        let mut replayer = Replayer::new(SessionConfig::default(), options);
        replayer.run(LOG.as_bytes()).expect("replay");

        let metrics = replayer.session().metrics();
        assert_eq!(metrics.duration, Duration::from_secs(2));
        assert_eq!(metrics.time_to_first_token, Some(Duration::from_millis(500)));
        assert!((metrics.tokens_per_second - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_line_reports_line_number() {
        let log = "{\"type\":\"token\",\"data\":{\"content\":\"a\"}}\n{\"type\":\"ping\"}\n";
        let mut replayer = Replayer::new(SessionConfig::default(), ReplayOptions::default());

        let err = replayer.run(log.as_bytes()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("ping"), "{message}");
        assert_eq!(replayer.session().content(), "a");
    }

    #[test]
    fn test_event_time_keeps_clock_without_timestamp() {
        let log = concat!(
            r#"{"type":"token","data":{"content":"a"},"timestamp":"2025-03-01T10:00:00Z"}"#,
            "\n",
            r#"{"type":"token","data":{"content":"b"}}"#,
            "\n",
            r#"{"type":"done","data":{},"timestamp":"2025-03-01T10:00:04Z"}"#,
            "\n",
        );
        let options = ReplayOptions {
            event_time: true,
            ..ReplayOptions::default()
        };
        let mut replayer = Replayer::new(SessionConfig::default(), options);

        replayer.feed_line(1, log.lines().next().unwrap_or_default()).expect("feed");
        replayer.feed_line(2, log.lines().nth(1).unwrap_or_default()).expect("feed");
        let start = replayer.session().start_time().expect("started");
        assert_eq!(replayer.session().duration(), Duration::ZERO);
        assert_eq!(start.to_rfc3339(), "2025-03-01T10:00:00+00:00");

        replayer.feed_line(3, log.lines().nth(2).unwrap_or_default()).expect("feed");
        let metrics = replayer.session().metrics();
        assert_eq!(metrics.duration, Duration::from_secs(4));
        assert_eq!(metrics.token_count, 2);
    }

    #[test]
    fn test_no_auto_start() {
        let options = ReplayOptions {
            auto_start: false,
            ..ReplayOptions::default()
        };
        let mut replayer = Replayer::new(SessionConfig::default(), options);
        replayer
            .feed_line(1, r#"{"type":"token","data":{"content":"x"}}"#)
            .expect("feed");

        assert!(!replayer.session().is_streaming());
        assert_eq!(replayer.session().start_time(), None);
        assert_eq!(replayer.session().content(), "x");
    }
}
