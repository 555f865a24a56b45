//! SessionLog: sessions derived from a flat array of lap slots.
//!
//! There are no headers. A session is a run of non-empty slots starting at
//! slot 0 or just after an empty slot, and ending at the next empty slot or
//! the end of the store. Two empty slots in a row mean no further sessions,
//! and the second of the pair is where the next session goes.
//!
//! ```text
//! slot:  0    1    2   3    4    5   6   7
//!       [150][200][ 0][310][290][ 0][ 0][ 0]
//!        \_session 0_/ \_session 1_/  ^ next session starts here
//! ```
//!
//! Every query rescans from the start, so each operation costs up to
//! O(capacity) reads. Nothing is cached between calls.

use anyhow::Result;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::lap::{LapHandle, LapTime};
use crate::store::LapStore;
use crate::summary::{SessionInfo, SessionSummary, Totals};

/// Session-level view over a [`LapStore`].
///
/// Works over an owned store or a `&mut` borrow of one.
#[derive(Debug)]
pub struct SessionLog<S> {
    store: S,
}

impl<S: LapStore> SessionLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Read with a bounds check: positions past the end read as the invalid marker.
    fn read_checked(&self, index: usize) -> LapTime {
        if index < self.store.capacity() {
            self.store.read(index)
        } else {
            LapTime::INVALID
        }
    }

    /// First position at or after `index` holding an empty slot, or capacity.
    fn run_end(&self, mut index: usize) -> usize {
        let capacity = self.store.capacity();
        while index < capacity && !self.store.read(index).is_empty() {
            index += 1;
        }
        index
    }

    /// Find where a new session can start.
    ///
    /// Returns 0 on an empty store. Otherwise the second slot of the first
    /// pair of consecutive empty slots, or [`LapHandle::INVALID`] when the
    /// store has no such pair.
    pub fn create_new_session(&self) -> LapHandle {
        let capacity = self.store.capacity();
        if capacity == 0 {
            warn!("lap store has no slots");
            return LapHandle::INVALID;
        }

        if self.store.read(0).is_empty() {
            debug!("new session at 0 (store empty)");
            return LapHandle::new(0);
        }

        let mut current = 0;
        while current < capacity {
            let end = self.run_end(current);
            let next = end + 1;
            if next < capacity && self.store.read(next).is_empty() {
                debug!("new session at {}", next);
                return LapHandle::from_index(next);
            }
            current = next;
        }

        warn!("lap store full: no free slot pair in {} slots", capacity);
        LapHandle::INVALID
    }

    /// Write `time` at `handle` if it lies inside the store.
    ///
    /// Returns `handle` on success and [`LapHandle::INVALID`] without writing
    /// otherwise.
    pub fn add_lap_time(&mut self, handle: LapHandle, time: LapTime) -> LapHandle {
        if handle.in_range(self.store.capacity()) {
            self.store.write(handle.index(), time);
            handle
        } else {
            LapHandle::INVALID
        }
    }

    /// The handle after `handle`, or [`LapHandle::INVALID`] if `handle` is
    /// outside the store.
    ///
    /// The result itself is not checked: `move_next(capacity - 1)` returns
    /// `capacity`, which the next bounds-checked call rejects.
    pub fn move_next(&self, handle: LapHandle) -> LapHandle {
        if handle.in_range(self.store.capacity()) {
            LapHandle::from_index(handle.index() + 1)
        } else {
            LapHandle::INVALID
        }
    }

    /// The handle before `handle`, or [`LapHandle::INVALID`] at 0.
    pub fn move_previous(&self, handle: LapHandle) -> LapHandle {
        if handle.is_invalid() || handle.index() == 0 {
            LapHandle::INVALID
        } else {
            LapHandle::from_index(handle.index() - 1)
        }
    }

    /// Write without a bounds check.
    ///
    /// # Panics
    ///
    /// With the provided stores, if `handle` is not below capacity.
    pub fn set_lap_time(&mut self, handle: LapHandle, time: LapTime) {
        self.store.write(handle.index(), time);
    }

    /// Read without a bounds check.
    ///
    /// # Panics
    ///
    /// With the provided stores, if `handle` is not below capacity.
    pub fn lap_time(&self, handle: LapHandle) -> LapTime {
        self.store.read(handle.index())
    }

    /// Empty every slot. The only way to reach a known state.
    pub fn clear_all(&mut self) {
        self.store.clear();
        debug!("cleared {} lap slots", self.store.capacity());
    }

    /// Count sessions and recorded laps across the whole store.
    pub fn totals(&self) -> Totals {
        let capacity = self.store.capacity();
        let mut totals = Totals::default();
        let mut index = 0;

        while index < capacity && !self.store.read(index).is_empty() {
            totals.sessions += 1;
            while index < capacity {
                let time = self.store.read(index);
                index += 1;
                if time.is_empty() {
                    break;
                }
                totals.laps_recorded += 1;
            }
        }

        totals.laps_remaining = capacity - totals.laps_recorded;
        totals
    }

    /// Average, best and count of the laps from `start` up to the next empty slot.
    ///
    /// The scan also stops at the invalid marker and at the end of the store.
    /// A start on an empty slot yields a zero-lap summary.
    pub fn session_summary(&self, start: LapHandle) -> SessionSummary {
        if start.is_invalid() {
            return SessionSummary::empty(LapTime::INVALID);
        }

        let mut index = start.index();
        let mut total: u64 = 0;
        let mut best = LapTime::INVALID;
        let mut lap_count = 0usize;

        let terminal = loop {
            let time = self.read_checked(index);
            if !time.is_lap() {
                break time;
            }
            total += u64::from(time.hundredths());
            best = best.min(time);
            lap_count += 1;
            index += 1;
        };

        if lap_count == 0 {
            return SessionSummary::empty(terminal);
        }

        SessionSummary {
            average: LapTime::saturating_from(total / lap_count as u64),
            best,
            lap_count,
            terminal,
        }
    }

    /// Handle of the first lap of session `session` (0-based), or
    /// [`LapHandle::INVALID`] if the store has fewer sessions.
    pub fn session_handle(&self, session: usize) -> LapHandle {
        let capacity = self.store.capacity();
        if capacity == 0 || self.store.read(0).is_empty() {
            warn!("session {} not found: store is empty", session);
            return LapHandle::INVALID;
        }

        let mut current = 0;
        for _ in 0..session {
            current = self.run_end(current + 1) + 1;
            if current >= capacity || self.store.read(current).is_empty() {
                warn!("session {} not found", session);
                return LapHandle::INVALID;
            }
        }

        LapHandle::from_index(current)
    }

    /// Every session in store order, summarized.
    pub fn sessions(&self) -> Sessions<'_, S> {
        Sessions {
            log: self,
            next: 0,
            index: 0,
        }
    }

    /// The laps of the session starting at `start`.
    pub fn laps(&self, start: LapHandle) -> Laps<'_, S> {
        Laps {
            log: self,
            next: if start.is_invalid() {
                self.store.capacity()
            } else {
                start.index()
            },
        }
    }

    /// Create a session holding `laps`, terminated when space allows.
    ///
    /// Nothing is written unless every lap is recordable and the whole
    /// session fits.
    pub fn record_session(&mut self, laps: &[LapTime]) -> Result<LapHandle, SessionError> {
        if laps.is_empty() {
            return Err(SessionError::EmptySession);
        }
        if let Some(bad) = laps.iter().find(|time| !time.is_lap()) {
            return Err(SessionError::InvalidLapTime(bad.hundredths()));
        }

        let capacity = self.store.capacity();
        let start = self
            .create_new_session()
            .ok_or(SessionError::StorageFull)?;

        let end = start.index() + laps.len();
        if end > capacity {
            return Err(SessionError::OutOfRange {
                handle: end - 1,
                capacity,
            });
        }

        let mut handle = start;
        for &time in laps {
            handle = self
                .add_lap_time(handle, time)
                .ok_or(SessionError::OutOfRange {
                    handle: handle.index(),
                    capacity,
                })?;
            handle = self.move_next(handle);
        }

        // A session that runs to the last slot needs no end marker.
        self.add_lap_time(handle, LapTime::EMPTY);

        debug!("recorded session at {} with {} laps", start, laps.len());
        Ok(start)
    }

    /// Persist pending writes.
    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }
}

/// Iterator returned by [`SessionLog::sessions`].
#[derive(Debug)]
pub struct Sessions<'a, S> {
    log: &'a SessionLog<S>,
    next: usize,
    index: usize,
}

impl<S: LapStore> Iterator for Sessions<'_, S> {
    type Item = SessionInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next;
        if start >= self.log.capacity() || self.log.store.read(start).is_empty() {
            return None;
        }

        let handle = LapHandle::from_index(start);
        let info = SessionInfo {
            index: self.index,
            start: handle,
            summary: self.log.session_summary(handle),
        };

        self.next = self.log.run_end(start) + 1;
        self.index += 1;
        Some(info)
    }
}

/// Iterator returned by [`SessionLog::laps`].
#[derive(Debug)]
pub struct Laps<'a, S> {
    log: &'a SessionLog<S>,
    next: usize,
}

impl<S: LapStore> Iterator for Laps<'_, S> {
    type Item = (LapHandle, LapTime);

    fn next(&mut self) -> Option<Self::Item> {
        let time = self.log.read_checked(self.next);
        if !time.is_lap() {
            return None;
        }
        let handle = LapHandle::from_index(self.next);
        self.next += 1;
        Some((handle, time))
    }
}
