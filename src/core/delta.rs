use crate::models::session::NewSession;

/// Outcome of comparing a cumulative observation with what sessions already cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDelta {
    Session(NewSession),
    NoSessionNeeded,
}

/// Incremental solving time revealed by `new_cumulative_seconds`.
///
/// `previously_recorded_total` is the sum of every session already stored for
/// the puzzle, not the last cumulative value seen. Replaying an observation
/// therefore yields zero, and a skipped intermediate observation still yields
/// the full difference.
///
/// Unknown observations and non-positive differences (no progress, clock skew,
/// a counter that went backwards) need no session.
pub fn compute_delta(
    puzzle_id: i64,
    new_cumulative_seconds: Option<i64>,
    previously_recorded_total: i64,
) -> SessionDelta {
    let Some(cumulative) = new_cumulative_seconds else {
        return SessionDelta::NoSessionNeeded;
    };

    match cumulative.checked_sub(previously_recorded_total) {
        Some(delta) if delta > 0 => SessionDelta::Session(NewSession {
            puzzle_id,
            solving_seconds: delta,
        }),
        _ => SessionDelta::NoSessionNeeded,
    }
}
