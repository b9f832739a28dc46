//! Tests for the phase timeline.

use chrono::{DateTime, TimeDelta, Utc};
use pretty_assertions::assert_eq;

use super::*;

fn at(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(millis)
}

#[test]
fn test_new_tracker_is_empty() {
    let tracker = PhaseTracker::new();
    assert!(tracker.is_empty());
    assert_eq!(tracker.current(), None);
    assert_eq!(tracker.current_phase(), None);
}

#[test]
fn test_start_closes_previous_phase() {
    let mut tracker = PhaseTracker::new();
    tracker.start(PhaseId::from("a"), "A".to_string(), at(0));
    tracker.start(PhaseId::from("b"), "B".to_string(), at(250));

    let history = tracker.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].completed_at, Some(at(250)));
    assert!(history[0].completed_at.unwrap() <= history[1].started_at);
    assert!(history[1].is_open());
    assert_eq!(tracker.current().map(PhaseId::as_str), Some("b"));
    assert_eq!(history[0].duration(), Some(std::time::Duration::from_millis(250)));
}

#[test]
fn test_same_phase_recurs() {
    let mut tracker = PhaseTracker::new();
    tracker.start(PhaseId::from("retrieving"), "R".to_string(), at(0));
    tracker.start(PhaseId::from("retrieving"), "R".to_string(), at(10));

    assert_eq!(tracker.len(), 2);
    assert_eq!(tracker.history()[0].completed_at, Some(at(10)));
}

#[test]
fn test_finalize_only_closes_open_phase() {
    let mut tracker = PhaseTracker::new();
    assert!(!tracker.finalize(at(0)));

    tracker.start(PhaseId::from("generating"), "G".to_string(), at(0));
    assert!(tracker.finalize(at(5)));
    assert!(!tracker.finalize(at(9)));

    assert_eq!(tracker.history()[0].completed_at, Some(at(5)));
    assert_eq!(tracker.current().map(PhaseId::as_str), Some("generating"));
}

#[test]
fn test_every_superseded_phase_is_closed() {
    let mut tracker = PhaseTracker::new();
    for (i, id) in ["routing", "retrieving", "generating", "retrieving"]
        .iter()
        .enumerate()
    {
        tracker.start(PhaseId::from(*id), id.to_string(), at(i as i64 * 100));
    }

    let (last, rest) = tracker.history().split_last().expect("non-empty");
    assert!(rest.iter().all(|phase| !phase.is_open()));
    assert!(last.is_open());
}

#[test]
fn test_clear_resets_everything() {
    let mut tracker = PhaseTracker::new();
    tracker.start(PhaseId::from("a"), "A".to_string(), at(0));
    tracker.clear();
    assert_eq!(tracker, PhaseTracker::default());
}

#[test]
fn test_default_labels() {
    assert_eq!(default_label(&PhaseId::from("generating")), "Generating response");
    assert_eq!(default_label(&PhaseId::from("retrieval")), "Retrieving context");
    assert_eq!(default_label(&PhaseId::from("web_lookup")), "Web lookup");
    assert_eq!(default_label(&PhaseId::from("re-rank")), "Re rank");
    assert_eq!(default_label(&PhaseId::from("")), "Working");
}
