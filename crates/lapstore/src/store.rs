//! LapStore: the raw storage capability under the session log.
//!
//! A store is a fixed number of 16-bit slots addressed by position. It knows
//! nothing about sessions; [`SessionLog`](crate::SessionLog) derives all
//! structure by scanning.

use anyhow::Result;

use crate::lap::LapTime;

/// Trait for lap storage backends.
///
/// Implemented by [`MemoryStore`] (tests, scratch use) and
/// [`ImageStore`](crate::ImageStore) (persistent image file).
pub trait LapStore {
    /// Read the value in slot `index`.
    ///
    /// Callers guarantee `index < capacity()`. Backends are not required to
    /// check; the provided ones panic.
    fn read(&self, index: usize) -> LapTime;

    /// Write `value` to slot `index`. Same precondition as [`read`](Self::read).
    fn write(&mut self, index: usize, value: LapTime);

    /// Set every slot to [`LapTime::EMPTY`].
    fn clear(&mut self);

    /// Number of slots. Fixed for the lifetime of the store.
    fn capacity(&self) -> usize;

    /// Push pending writes to the underlying medium.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: LapStore + ?Sized> LapStore for &mut S {
    fn read(&self, index: usize) -> LapTime {
        (**self).read(index)
    }

    fn write(&mut self, index: usize, value: LapTime) {
        (**self).write(index, value)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<S: LapStore + ?Sized> LapStore for Box<S> {
    fn read(&self, index: usize) -> LapTime {
        (**self).read(index)
    }

    fn write(&mut self, index: usize, value: LapTime) {
        (**self).write(index, value)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// In-memory store. Starts all-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    slots: Vec<LapTime>,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![LapTime::EMPTY; capacity],
        }
    }

    /// Store pre-populated with raw values; capacity is `laps.len()`.
    pub fn from_laps(laps: &[u16]) -> Self {
        Self {
            slots: laps.iter().copied().map(LapTime::from).collect(),
        }
    }

    pub fn as_slice(&self) -> &[LapTime] {
        &self.slots
    }
}

impl LapStore for MemoryStore {
    fn read(&self, index: usize) -> LapTime {
        self.slots[index]
    }

    fn write(&mut self, index: usize, value: LapTime) {
        self.slots[index] = value;
    }

    fn clear(&mut self) {
        self.slots.fill(LapTime::EMPTY);
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_empty() {
        let store = MemoryStore::new(8);
        assert_eq!(store.capacity(), 8);
        assert!((0..8).all(|i| store.read(i).is_empty()));
    }

    #[test]
    fn test_write_and_read() {
        let mut store = MemoryStore::new(4);
        store.write(2, LapTime::new(4321));
        assert_eq!(store.read(2), LapTime::new(4321));
        assert_eq!(store.read(1), LapTime::EMPTY);
    }

    #[test]
    fn test_round_trip_every_slot() {
        let mut store = MemoryStore::new(16);
        for h in 0..16 {
            let v = LapTime::new(1 + (h as u16) * 4095);
            store.write(h, v);
            assert_eq!(store.read(h), v);
        }
    }

    #[test]
    fn test_clear_resets_all_slots() {
        let mut store = MemoryStore::from_laps(&[5, 6, 0, 7, 8]);
        store.clear();
        assert_eq!(store.capacity(), 5);
        assert!(store.as_slice().iter().all(|t| t.is_empty()));
    }

    #[test]
    fn test_through_mut_ref_and_box() {
        let mut store = MemoryStore::new(3);
        {
            let by_ref: &mut MemoryStore = &mut store;
            by_ref.write(0, LapTime::new(99));
            assert_eq!(LapStore::capacity(&by_ref), 3);
        }
        assert_eq!(store.read(0), LapTime::new(99));

        let mut boxed: Box<dyn LapStore> = Box::new(store);
        boxed.write(1, LapTime::new(100));
        assert_eq!(boxed.read(1), LapTime::new(100));
        assert!(boxed.flush().is_ok());
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_read_panics() {
        let store = MemoryStore::new(2);
        store.read(2);
    }
}
