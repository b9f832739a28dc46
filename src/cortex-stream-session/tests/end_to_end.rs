//! End-to-end turns driven through the wire envelope.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cortex_stream_session::protocol::{StreamEvent, ToolType};
use cortex_stream_session::{
    ManualClock, SessionConfig, SessionError, StreamSession, ToolCall, ToolCallStatus,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const TURN: &[&str] = &[
    r#"{"type":"phase_start","data":{"phase":"generating"}}"#,
    r#"{"type":"token","data":{"content":"Hel"}}"#,
    r#"{"type":"token","data":{"content":"lo"}}"#,
    r#"{"type":"tool_call","data":{"id":"s1","name":"search","type":"search"}}"#,
    r#"{"type":"tool_result","data":{"id":"s1","output":{"n":1}}}"#,
    r#"{"type":"done","data":{}}"#,
];

#[test]
fn test_wire_turn_produces_final_state() {
    let mut session = StreamSession::new();
    session.start_stream();

    for line in TURN {
        session.handle_json_event(line).expect("valid event");
    }

    let snapshot = session.snapshot();
    assert_eq!(snapshot.content, "Hello");
    assert_eq!(snapshot.tool_calls.len(), 1);
    assert_eq!(snapshot.tool_calls[0].id.as_str(), "s1");
    assert_eq!(snapshot.tool_calls[0].status, ToolCallStatus::Completed);
    assert_eq!(snapshot.tool_calls[0].output, Some(json!({"n": 1})));
    assert!(!snapshot.is_streaming);
    assert_eq!(
        snapshot.current_phase.as_ref().map(|id| id.as_str()),
        Some("generating")
    );
    assert!(snapshot.phase_history[0].completed_at.is_some());
    assert_eq!(snapshot.error, None);
}

#[test]
fn test_turn_with_recorded_timeline() {
    let clock = ManualClock::new(DateTime::<Utc>::UNIX_EPOCH);
    let config = SessionConfig::from_toml_str("throughput_epsilon_ms = 1").expect("config");
    let mut session = StreamSession::with_parts(config, Arc::new(clock.clone()));

    session.start_stream();
    session.handle_stream_event(StreamEvent::phase_start("retrieving", None));
    session.handle_stream_event(StreamEvent::tool_call(
        "s1",
        "search",
        ToolType::Search,
        Some(json!({"q": "weather"})),
    ));
    clock.advance_millis(300);
    session.handle_stream_event(StreamEvent::tool_result("s1", Some(json!(["sunny"]))));
    session.handle_stream_event(StreamEvent::phase_start("generating", None));
    clock.advance_millis(200);
    session.handle_stream_event(StreamEvent::token("It is "));
    session.handle_stream_event(StreamEvent::token("sunny."));
    clock.advance_millis(500);
    session.handle_stream_event(StreamEvent::done());

    let phases = session.phase_history();
    assert_eq!(phases.len(), 2);
    assert_eq!(phases[0].duration(), Some(Duration::from_millis(300)));
    assert_eq!(phases[1].duration(), Some(Duration::from_millis(700)));

    let metrics = session.metrics();
    assert_eq!(metrics.duration, Duration::from_secs(1));
    assert_eq!(metrics.time_to_first_token, Some(Duration::from_millis(500)));
    assert!((metrics.tokens_per_second - 2.0).abs() < 1e-9);

    let call = session.tool_call("s1").expect("s1");
    assert_eq!(call.duration(), Some(Duration::from_millis(300)));
}

#[test]
fn test_concurrent_tool_calls_keep_most_recent_active() {
    let mut session = StreamSession::new();
    session.start_stream();
    session.add_tool_call(ToolCall::new("a", "search", ToolType::Search));
    session.add_tool_call(ToolCall::new("b", "python", ToolType::Code));

    session.complete_tool_call("b", Some(json!(42)), None);

    assert_eq!(session.active_tool_id(), None);
    assert_eq!(session.outstanding_tool_ids().len(), 1);
    assert_eq!(session.outstanding_tool_ids()[0].as_str(), "a");
}

#[test]
fn test_malformed_line_does_not_desync_state() {
    let mut session = StreamSession::new();
    session.start_stream();
    session.handle_json_event(TURN[1]).expect("token");

    let before = session.snapshot();
    let err = session
        .handle_json_event(r#"{"type":"progress","data":{"pct":50}}"#)
        .unwrap_err();

    assert!(matches!(err, SessionError::Protocol(_)));
    assert_eq!(session.content(), before.content);
    assert_eq!(session.token_count(), before.tokens.len());
}

#[test]
fn test_reset_after_turn_equals_fresh_session() {
    let mut session = StreamSession::new();
    session.start_stream();
    for line in TURN {
        session.handle_json_event(line).expect("valid event");
    }

    session.reset();
    assert_eq!(session.snapshot(), StreamSession::new().snapshot());
}
