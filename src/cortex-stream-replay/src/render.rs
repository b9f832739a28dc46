//! Human-readable rendering of a session snapshot.

use std::fmt::Write;
use std::time::Duration;

use cortex_stream_session::SessionSnapshot;

/// Formats a duration as `850ms` or `1.25s`.
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

fn status_line(snapshot: &SessionSnapshot) -> String {
    match (&snapshot.error, snapshot.is_streaming, snapshot.is_paused) {
        (Some(error), _, _) => format!("failed: {error}"),
        (None, true, true) => "paused".to_string(),
        (None, true, false) => "streaming".to_string(),
        (None, false, _) if snapshot.end_time.is_some() => "ended".to_string(),
        (None, false, _) => "idle".to_string(),
    }
}

/// Renders a summary of phases, tool calls, content and metrics.
pub fn render_summary(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Status: {}", status_line(snapshot));

    if !snapshot.phase_history.is_empty() {
        let _ = writeln!(out, "Phases:");
        for (i, phase) in snapshot.phase_history.iter().enumerate() {
            let timing = phase
                .duration()
                .map(format_duration)
                .unwrap_or_else(|| "open".to_string());
            let _ = writeln!(out, "  {}. {} [{}] {}", i + 1, phase.name, phase.id, timing);
        }
    }

    if !snapshot.tool_calls.is_empty() {
        let _ = writeln!(out, "Tool calls:");
        for call in &snapshot.tool_calls {
            let marker = if snapshot.active_tool_id.as_ref() == Some(&call.id) {
                "*"
            } else {
                " "
            };
            let _ = write!(
                out,
                " {marker}{} {} ({}) {}",
                call.id, call.name, call.tool_type, call.status
            );
            if let Some(duration) = call.duration() {
                let _ = write!(out, " {}", format_duration(duration));
            }
            if let Some(error) = &call.error {
                let _ = write!(out, " - {error}");
            }
            out.push('\n');
        }
    }

    let _ = writeln!(out, "Content:");
    for line in snapshot.content.lines() {
        let _ = writeln!(out, "  {line}");
    }

    let metrics = &snapshot.metrics;
    let _ = write!(
        out,
        "Metrics: {} tokens, {} bytes, {}, {:.1} tok/s",
        metrics.token_count,
        metrics.bytes_received,
        format_duration(metrics.duration),
        metrics.tokens_per_second
    );
    if let Some(ttft) = metrics.time_to_first_token {
        let _ = write!(out, ", first token after {}", format_duration(ttft));
    }
    out.push('\n');
    out
}
