//! Result types produced by session scans.

use serde::{Deserialize, Serialize};

use crate::lap::{LapHandle, LapTime};

/// Store-wide totals from [`SessionLog::totals`](crate::SessionLog::totals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Number of sessions found.
    pub sessions: usize,

    /// Laps recorded across all sessions.
    pub laps_recorded: usize,

    /// Capacity minus laps recorded.
    ///
    /// Indicative only: every session also spends one slot on its end
    /// marker, so ten sessions of five laps use sixty slots, not fifty.
    pub laps_remaining: usize,
}

/// Aggregate over one session from [`SessionLog::session_summary`](crate::SessionLog::session_summary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Integer mean of the laps, or 0 when there are none.
    pub average: LapTime,

    /// Fastest lap. [`LapTime::INVALID`] when there are no laps.
    pub best: LapTime,

    /// Laps in the session.
    pub lap_count: usize,

    /// Value that ended the scan: [`LapTime::EMPTY`] at a session end,
    /// [`LapTime::INVALID`] at the end of the store.
    pub terminal: LapTime,
}

impl SessionSummary {
    /// Summary of a session with no laps.
    pub const fn empty(terminal: LapTime) -> Self {
        Self {
            average: LapTime::EMPTY,
            best: LapTime::INVALID,
            lap_count: 0,
            terminal,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.lap_count == 0
    }
}

/// One entry of [`SessionLog::sessions`](crate::SessionLog::sessions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Position of the session in store order, from 0.
    pub index: usize,

    /// Handle of the session's first lap.
    pub start: LapHandle,

    #[serde(flatten)]
    pub summary: SessionSummary,
}
