use puzzlesync::core::delta::{SessionDelta, compute_delta};
use puzzlesync::core::normalize::Normalizer;
use puzzlesync::core::reconcile::reconcile;
use puzzlesync::models::puzzle::{PuzzleRecord, PuzzleState};
use puzzlesync::models::session::NewSession;
use puzzlesync::models::summary::StateAction;

mod common;
use common::{puzzle_raw, ts};

fn record(puzzle_id: i64, solving_seconds: Option<i64>) -> PuzzleRecord {
    Normalizer::default()
        .normalize(&puzzle_raw(puzzle_id, solving_seconds))
        .expect("valid record")
}

// ---------------------------
// Session delta
// ---------------------------

#[test]
fn test_delta_is_difference_from_recorded_sum() {
    assert_eq!(
        compute_delta(100, Some(450), 300),
        SessionDelta::Session(NewSession {
            puzzle_id: 100,
            solving_seconds: 150
        })
    );
    assert_eq!(
        compute_delta(100, Some(300), 0),
        SessionDelta::Session(NewSession {
            puzzle_id: 100,
            solving_seconds: 300
        })
    );
}

#[test]
fn test_delta_without_progress_needs_no_session() {
    // replay of the same cumulative value
    assert_eq!(compute_delta(100, Some(450), 450), SessionDelta::NoSessionNeeded);
    // counter went backwards
    assert_eq!(compute_delta(100, Some(300), 450), SessionDelta::NoSessionNeeded);
    // nothing solved yet
    assert_eq!(compute_delta(100, Some(0), 0), SessionDelta::NoSessionNeeded);
    // unknown observation
    assert_eq!(compute_delta(100, None, 0), SessionDelta::NoSessionNeeded);
    assert_eq!(compute_delta(100, None, 450), SessionDelta::NoSessionNeeded);
}

#[test]
fn test_delta_does_not_overflow() {
    assert_eq!(
        compute_delta(1, Some(i64::MAX), -1),
        SessionDelta::NoSessionNeeded
    );
}

// ---------------------------
// State reconciliation
// ---------------------------

#[test]
fn test_reconcile_new_puzzle_is_insert() {
    let now = ts("2024-03-04T10:00:00Z");
    let rec = record(100, Some(300));

    let d = reconcile(None, &rec, now);

    assert_eq!(d.action, StateAction::Insert);
    assert!(d.changed);
    assert_eq!(d.state.record, rec);
    assert_eq!(d.state.created_at, now);
    assert_eq!(d.state.last_updated_at, now);
    assert_eq!(d.expected_last_updated_at, None);
}

#[test]
fn test_reconcile_identical_is_noop_and_keeps_timestamp() {
    let created = ts("2024-03-04T10:00:00Z");
    let stored = PuzzleState::new(record(100, Some(300)), created);

    let d = reconcile(Some(&stored), &record(100, Some(300)), ts("2024-03-05T10:00:00Z"));

    assert_eq!(d.action, StateAction::Noop);
    assert!(!d.changed);
    assert!(d.changed_fields.is_empty());
    assert_eq!(d.state, stored);
    assert_eq!(d.state.last_updated_at, created);
}

#[test]
fn test_reconcile_change_keeps_created_at() {
    let created = ts("2024-03-04T10:00:00Z");
    let later = ts("2024-03-05T08:30:00Z");
    let stored = PuzzleState::new(record(100, Some(300)), created);

    let d = reconcile(Some(&stored), &record(100, Some(450)), later);

    assert_eq!(d.action, StateAction::Update);
    assert!(d.changed);
    assert_eq!(d.changed_fields, vec!["solving_seconds"]);
    assert_eq!(d.state.record.solving_seconds, Some(450));
    assert_eq!(d.state.created_at, created);
    assert_eq!(d.state.last_updated_at, later);
    assert_eq!(d.expected_last_updated_at, Some(created));
}

#[test]
fn test_reconcile_null_aware_comparison() {
    let created = ts("2024-03-04T10:00:00Z");
    let now = ts("2024-03-05T10:00:00Z");

    // stored NULL, incoming value
    let mut without_title = record(100, Some(300));
    without_title.title = None;
    let stored = PuzzleState::new(without_title.clone(), created);
    let d = reconcile(Some(&stored), &record(100, Some(300)), now);
    assert_eq!(d.action, StateAction::Update);
    assert_eq!(d.changed_fields, vec!["title"]);

    // stored value, incoming NULL
    let stored = PuzzleState::new(record(100, Some(300)), created);
    let d = reconcile(Some(&stored), &without_title, now);
    assert_eq!(d.changed_fields, vec!["title"]);
    assert_eq!(d.state.record.title, None);

    // both NULL
    let stored = PuzzleState::new(without_title.clone(), created);
    let d = reconcile(Some(&stored), &without_title, now);
    assert_eq!(d.action, StateAction::Noop);
}

#[test]
fn test_reconcile_reports_every_changed_field() {
    let stored = PuzzleState::new(record(100, Some(300)), ts("2024-03-04T10:00:00Z"));

    let mut incoming = record(100, Some(300));
    incoming.percent_filled = 40.0;
    incoming.solved = false;
    incoming.star = None;

    let d = reconcile(Some(&stored), &incoming, ts("2024-03-05T10:00:00Z"));
    assert_eq!(d.changed_fields, vec!["percent_filled", "solved", "star"]);
}

#[test]
fn test_reconcile_unknown_seconds_keeps_stored_value() {
    let stored = PuzzleState::new(record(100, Some(300)), ts("2024-03-04T10:00:00Z"));

    let d = reconcile(Some(&stored), &record(100, None), ts("2024-03-05T10:00:00Z"));
    assert_eq!(d.action, StateAction::Noop);
    assert_eq!(d.state.record.solving_seconds, Some(300));

    let mut incoming = record(100, None);
    incoming.version = 2;
    let d = reconcile(Some(&stored), &incoming, ts("2024-03-05T10:00:00Z"));
    assert_eq!(d.action, StateAction::Update);
    assert_eq!(d.changed_fields, vec!["version"]);
    assert_eq!(d.state.record.solving_seconds, Some(300));
}

#[test]
fn test_reconcile_clock_behind_created_at() {
    let created = ts("2024-03-05T10:00:00Z");
    let stored = PuzzleState::new(record(100, Some(300)), created);

    let d = reconcile(Some(&stored), &record(100, Some(450)), ts("2024-03-04T10:00:00Z"));
    assert_eq!(d.state.last_updated_at, created);
    assert!(d.state.last_updated_at >= d.state.created_at);
}
