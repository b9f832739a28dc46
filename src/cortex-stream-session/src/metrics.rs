//! Duration and throughput metrics.
//!
//! Nothing here is cached. Every value is derived from the session's
//! timestamps and token buffer at the moment it is read, so it always
//! reflects the latest fragment and end time.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::buffer::TokenBuffer;

/// Snapshot of a turn's performance metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamMetrics {
    /// Time since the stream started, up to its end if it ended.
    pub duration: Duration,
    /// Fragments per second over `duration`.
    pub tokens_per_second: f64,
    /// Delay between stream start and the first fragment.
    pub time_to_first_token: Option<Duration>,
    pub token_count: usize,
    pub bytes_received: usize,
}

impl StreamMetrics {
    /// Computes metrics for a stream started at `start`.
    pub fn compute(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        buffer: &TokenBuffer,
        now: DateTime<Utc>,
        epsilon: Duration,
    ) -> Self {
        let duration = duration(start, end, now);
        Self {
            duration,
            tokens_per_second: tokens_per_second(buffer.token_count(), duration, epsilon),
            time_to_first_token: time_to_first_token(start, buffer.first_token_at()),
            token_count: buffer.token_count(),
            bytes_received: buffer.bytes_received(),
        }
    }
}

/// `(end or now) - start`, clamped at zero. Zero if never started.
pub fn duration(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Duration {
    let Some(start) = start else {
        return Duration::ZERO;
    };
    let end = end.unwrap_or(now);
    (end - start).to_std().unwrap_or(Duration::ZERO)
}

/// `token_count / max(duration, epsilon)` in seconds.
///
/// The floor keeps the result finite right after the stream starts.
pub fn tokens_per_second(token_count: usize, duration: Duration, epsilon: Duration) -> f64 {
    let seconds = duration.max(epsilon).as_secs_f64();
    if seconds > 0.0 {
        token_count as f64 / seconds
    } else {
        0.0
    }
}

/// Delay from `start` to the first fragment, if both are known.
pub fn time_to_first_token(
    start: Option<DateTime<Utc>>,
    first_token_at: Option<DateTime<Utc>>,
) -> Option<Duration> {
    match (start, first_token_at) {
        (Some(start), Some(first)) => Some((first - start).to_std().unwrap_or(Duration::ZERO)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(millis)
    }

    const EPSILON: Duration = Duration::from_millis(1);

    #[test]
    fn test_duration_not_started() {
        assert_eq!(duration(None, None, at(100)), Duration::ZERO);
    }

    #[test]
    fn test_duration_running_and_ended() {
        assert_eq!(duration(Some(at(0)), None, at(250)), Duration::from_millis(250));
        assert_eq!(
            duration(Some(at(0)), Some(at(100)), at(900)),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_duration_never_negative() {
        assert_eq!(duration(Some(at(500)), None, at(100)), Duration::ZERO);
    }

    #[test]
    fn test_tokens_per_second() {
        let rate = tokens_per_second(10, Duration::from_secs(2), EPSILON);
        assert!((rate - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tokens_per_second_at_zero_duration_is_finite() {
        let rate = tokens_per_second(3, Duration::ZERO, EPSILON);
        assert!(rate.is_finite());
        assert!((rate - 3000.0).abs() < 1e-6);

        assert_eq!(tokens_per_second(0, Duration::ZERO, EPSILON), 0.0);
    }

    #[test]
    fn test_compute_reads_buffer() {
        let mut buffer = TokenBuffer::new();
        buffer.push("ab".to_string(), at(200));
        buffer.push("c".to_string(), at(300));

        let metrics = StreamMetrics::compute(Some(at(0)), Some(at(1000)), &buffer, at(5000), EPSILON);

        assert_eq!(metrics.duration, Duration::from_secs(1));
        assert!((metrics.tokens_per_second - 2.0).abs() < 1e-9);
        assert_eq!(metrics.time_to_first_token, Some(Duration::from_millis(200)));
        assert_eq!(metrics.token_count, 2);
        assert_eq!(metrics.bytes_received, 3);
    }
}
