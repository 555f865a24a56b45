//! LapTime and LapHandle: the two 16-bit quantities the store deals in.
//!
//! A lap time is elapsed time in hundredths of a second. Two values are
//! reserved: `0` marks an empty slot (and terminates a session), `65535`
//! is the invalid marker shared with [`LapHandle::INVALID`]. Real lap times
//! therefore run from 1 to 65534 (655.34 seconds).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LapTimeError, SessionError};

/// A stored lap time in hundredths of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LapTime(u16);

impl LapTime {
    /// Sentinel: empty slot / end of session.
    pub const EMPTY: LapTime = LapTime(0);

    /// Reserved invalid marker. Never a real lap time.
    pub const INVALID: LapTime = LapTime(u16::MAX);

    /// Largest representable lap time (655.34 s).
    pub const MAX: LapTime = LapTime(u16::MAX - 1);

    pub const fn new(hundredths: u16) -> Self {
        Self(hundredths)
    }

    /// Raw value in hundredths of a second.
    pub const fn hundredths(self) -> u16 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == Self::EMPTY.0
    }

    pub const fn is_invalid(self) -> bool {
        self.0 == Self::INVALID.0
    }

    /// True for values that may be stored as a real lap (neither reserved value).
    pub const fn is_lap(self) -> bool {
        !self.is_empty() && !self.is_invalid()
    }

    /// Build from hundredths, saturating at [`LapTime::MAX`].
    pub fn saturating_from(hundredths: u64) -> Self {
        Self(hundredths.min(u64::from(Self::MAX.0)) as u16)
    }

    /// Little-endian byte pair as laid out in a store image.
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }
}

impl From<u16> for LapTime {
    fn from(hundredths: u16) -> Self {
        Self(hundredths)
    }
}

impl From<LapTime> for u16 {
    fn from(time: LapTime) -> Self {
        time.0
    }
}

impl fmt::Display for LapTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses `m:ss.dd`, `ss.dd` or a raw count of hundredths.
///
/// The sentinel and the invalid marker are rejected: a parsed value is
/// always something that can be recorded as a lap.
impl FromStr for LapTime {
    type Err = LapTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LapTimeError::Malformed(s.to_string()));
        }

        let hundredths = if s.contains(':') || s.contains('.') {
            parse_clock(s)?
        } else {
            s.parse::<u64>()
                .map_err(|_| LapTimeError::Malformed(s.to_string()))?
        };

        if hundredths == 0 {
            return Err(LapTimeError::Sentinel);
        }
        if hundredths > u64::from(Self::MAX.0) {
            return Err(LapTimeError::TooLong(hundredths));
        }

        Ok(Self(hundredths as u16))
    }
}

fn parse_clock(s: &str) -> Result<u64, LapTimeError> {
    let malformed = || LapTimeError::Malformed(s.to_string());

    let (minutes, rest) = match s.split_once(':') {
        Some((m, rest)) => (m.parse::<u64>().map_err(|_| malformed())?, rest),
        None => (0, s),
    };

    let (seconds, fraction) = match rest.split_once('.') {
        Some((sec, frac)) => (sec, frac),
        None => (rest, "0"),
    };

    let seconds = seconds.parse::<u64>().map_err(|_| malformed())?;
    if minutes > 0 && seconds >= 60 {
        return Err(malformed());
    }

    if fraction.is_empty() || fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    let mut hundredths = fraction.parse::<u64>().map_err(|_| malformed())?;
    if fraction.len() == 1 {
        hundredths *= 10;
    }

    Ok((minutes * 60 + seconds) * 100 + hundredths)
}

/// A position in the store. Valid handles are below the store's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LapHandle(u16);

impl LapHandle {
    /// Out-of-band "no such position".
    pub const INVALID: LapHandle = LapHandle(u16::MAX);

    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Handle for a slot index; indices that do not fit become [`LapHandle::INVALID`].
    pub fn from_index(index: usize) -> Self {
        u16::try_from(index).map(Self).unwrap_or(Self::INVALID)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_invalid(self) -> bool {
        self.0 == Self::INVALID.0
    }

    /// Whether this handle names a real slot in a store of `capacity` slots.
    pub const fn in_range(self, capacity: usize) -> bool {
        !self.is_invalid() && (self.0 as usize) < capacity
    }

    /// Turn a sentinel return into a `Result`.
    pub fn ok_or(self, err: SessionError) -> Result<LapHandle, SessionError> {
        if self.is_invalid() {
            Err(err)
        } else {
            Ok(self)
        }
    }
}

impl fmt::Display for LapHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "invalid")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u16> for LapHandle {
    fn from(index: u16) -> Self {
        Self(index)
    }
}
