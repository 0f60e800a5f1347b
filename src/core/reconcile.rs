use crate::models::puzzle::{PuzzleRecord, PuzzleState};
use crate::models::summary::StateAction;
use chrono::{DateTime, Utc};

/// Decision for one `crossword_stats` row.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub action: StateAction,
    pub state: PuzzleState,
    pub changed: bool,
    pub changed_fields: Vec<&'static str>,
    /// `last_updated_at` as read before the decision; the UPDATE is
    /// conditional on it still being stored.
    pub expected_last_updated_at: Option<DateTime<Utc>>,
}

/// Compare an observation with the stored row (if any) and decide what to write.
///
/// A new puzzle is an INSERT stamped with `now`. An existing one is an UPDATE
/// only when some field differs (NULL-aware); otherwise it is a NOOP and the
/// stored state, `last_updated_at` included, is returned untouched.
pub fn reconcile(
    existing: Option<&PuzzleState>,
    record: &PuzzleRecord,
    now: DateTime<Utc>,
) -> Reconciliation {
    let Some(current) = existing else {
        return Reconciliation {
            action: StateAction::Insert,
            state: PuzzleState::new(record.clone(), now),
            changed: true,
            changed_fields: Vec::new(),
            expected_last_updated_at: None,
        };
    };

    let mut incoming = record.clone();

    // an unknown cumulative time is "not observed", keep what we have
    if incoming.solving_seconds.is_none() {
        incoming.solving_seconds = current.record.solving_seconds;
    }

    let changed_fields = current.record.changed_fields(&incoming);

    if changed_fields.is_empty() {
        return Reconciliation {
            action: StateAction::Noop,
            state: current.clone(),
            changed: false,
            changed_fields,
            expected_last_updated_at: Some(current.last_updated_at),
        };
    }

    Reconciliation {
        action: StateAction::Update,
        state: PuzzleState {
            record: incoming,
            created_at: current.created_at,
            // last_updated_at >= created_at, even if a previous run's clock was ahead
            last_updated_at: now.max(current.created_at),
        },
        changed: true,
        changed_fields,
        expected_last_updated_at: Some(current.last_updated_at),
    }
}
