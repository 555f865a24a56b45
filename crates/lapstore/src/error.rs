//! Domain errors for the session log and lap-time parsing.
//!
//! Core scans report failure through [`LapHandle::INVALID`](crate::LapHandle::INVALID);
//! these types give the same failures a name for callers working with `Result`.

use thiserror::Error;

/// Failures of session-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("handle {handle} is outside the store (capacity {capacity})")]
    OutOfRange { handle: usize, capacity: usize },

    #[error("no free space for a new session")]
    StorageFull,

    #[error("session {0} does not exist")]
    SessionNotFound(usize),

    #[error("lap time {0} is reserved and cannot be recorded")]
    InvalidLapTime(u16),

    #[error("a session needs at least one lap")]
    EmptySession,
}

/// Errors parsing a lap time from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LapTimeError {
    #[error("malformed lap time '{0}': expected m:ss.dd, ss.dd or hundredths")]
    Malformed(String),

    #[error("a zero lap time is the end-of-session marker")]
    Sentinel,

    #[error("lap time of {0} hundredths exceeds the 655.34s maximum")]
    TooLong(u64),
}
