use std::sync::Arc;

use joblog_core::{Clock, JobEvent, LogEntry, ManualClock, SystemClock};

#[test]
fn test_clock_as_trait_object() {
    let manual = Arc::new(ManualClock::new(42));
    let clock: Arc<dyn Clock> = manual.clone();
    assert_eq!(clock.now_ms(), 42);
    manual.advance(8);
    assert_eq!(clock.now_ms(), 50);
}

#[test]
fn test_system_clock_moves_forward() {
    let a = SystemClock.now_ms();
    let b = SystemClock.now_ms();
    assert!(b >= a);
}

#[test]
fn test_entry_pairs_are_independent() {
    let mut entry = LogEntry::new("StartedCompletedStarted");
    entry.last_started = Some(JobEvent::new(9, "v9"));
    entry.last_completed = Some(JobEvent::new(10, "v10"));
    entry.last_started = Some(JobEvent::new(11, "v11"));
    assert_eq!(entry.last_started_time(), Some(11));
    assert_eq!(entry.last_started_version(), Some("v11"));
    assert_eq!(entry.last_completed_time(), Some(10));
    assert_eq!(entry.last_completed_version(), Some("v10"));
}

#[test]
fn test_entry_json_omits_missing_events() {
    let mut entry = LogEntry::new("CompletedOnly");
    entry.last_completed = Some(JobEvent::new(4, "v4"));
    let json = serde_json::to_string(&entry).unwrap();
    assert!(!json.contains("last_started"));
    let back: LogEntry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, entry);
}
