//! Lap time display and capture conversion.

use crate::lap::LapTime;

/// Render a lap time as `m:ss.dd`.
///
/// The minute field is a single digit, so laps of ten minutes or more have
/// no rendering and return `None`.
pub fn format_lap_time(time: LapTime) -> Option<String> {
    let hundredths = u32::from(time.hundredths());
    let seconds = hundredths / 100;
    let minutes = seconds / 60;

    if minutes > 9 {
        return None;
    }

    Some(format!(
        "{}:{:02}.{:02}",
        minutes,
        seconds % 60,
        hundredths % 100
    ))
}

/// Convert a millisecond timer reading to a lap time.
///
/// Clamped to `1..=`[`LapTime::MAX`], so a reading under 10 ms never
/// becomes the end-of-session marker.
pub fn lap_time_from_millis(millis: u64) -> LapTime {
    LapTime::saturating_from((millis / 10).max(1))
}
