//! CLI command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lapstore::{
    format_lap_time, ImageStore, LapHandle, LapStoreConfig, LapTime, SessionError, SessionLog,
    SessionSummary,
};
use serde_json::json;
use tracing::debug;

/// How results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    fn emit(&self, value: serde_json::Value, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

/// Build the store config: file (or environment), then command-line overrides.
pub fn resolve_config(
    config_path: Option<&Path>,
    image: Option<PathBuf>,
    capacity: Option<usize>,
) -> Result<LapStoreConfig> {
    let mut config = match config_path {
        Some(path) => LapStoreConfig::from_file(path)?,
        None => LapStoreConfig::from_env()?,
    };

    if let Some(image) = image {
        config.image_path = image;
    }
    if let Some(capacity) = capacity {
        config.capacity = capacity;
    }

    config.validate()?;
    debug!(
        "using image {} ({} slots)",
        config.image_path.display(),
        config.capacity
    );
    Ok(config)
}

fn open_log(config: &LapStoreConfig) -> Result<SessionLog<ImageStore>> {
    let store = ImageStore::open_config(config)
        .with_context(|| format!("failed to open lap store {}", config.image_path.display()))?;
    Ok(SessionLog::new(store))
}

/// Lap time for display; laps of ten minutes or more fall back to seconds.
fn display_time(time: LapTime) -> String {
    format_lap_time(time).unwrap_or_else(|| {
        format!("{}.{:02}s", time.hundredths() / 100, time.hundredths() % 100)
    })
}

fn summary_line(summary: &SessionSummary) -> String {
    if summary.is_empty() {
        return "0 laps".to_string();
    }
    format!(
        "{} laps, best {}, average {}",
        summary.lap_count,
        display_time(summary.best),
        display_time(summary.average)
    )
}

fn find_session(log: &SessionLog<ImageStore>, session: usize) -> Result<LapHandle> {
    Ok(log
        .session_handle(session)
        .ok_or(SessionError::SessionNotFound(session))?)
}

/// Clear every slot
pub fn init(config: &LapStoreConfig, output: Output) -> Result<()> {
    let mut log = open_log(config)?;
    log.clear_all();
    log.flush()?;

    output.emit(
        json!({ "image": config.image_path, "capacity": log.capacity() }),
        || {
            format!(
                "Cleared {} slots in {}",
                log.capacity(),
                config.image_path.display()
            )
        },
    )
}

/// Print where a new session would start
pub fn new_session(config: &LapStoreConfig, output: Output) -> Result<()> {
    let log = open_log(config)?;
    let handle = log.create_new_session().ok_or(SessionError::StorageFull)?;

    output.emit(json!({ "handle": handle }), || handle.to_string())
}

/// Write a lap at a handle and print the next handle
pub fn add(config: &LapStoreConfig, output: Output, handle: u16, time: LapTime) -> Result<()> {
    let mut log = open_log(config)?;
    let capacity = log.capacity();
    let handle = log
        .add_lap_time(LapHandle::new(handle), time)
        .ok_or(SessionError::OutOfRange {
            handle: usize::from(handle),
            capacity,
        })?;
    log.flush()?;

    let next = log.move_next(handle);
    output.emit(json!({ "handle": handle, "next": next }), || {
        format!("{} at {}, next {}", display_time(time), handle, next)
    })
}

/// Write the end-of-session marker at a handle
pub fn end(config: &LapStoreConfig, output: Output, handle: u16) -> Result<()> {
    let mut log = open_log(config)?;
    let capacity = log.capacity();
    let handle = log
        .add_lap_time(LapHandle::new(handle), LapTime::EMPTY)
        .ok_or(SessionError::OutOfRange {
            handle: usize::from(handle),
            capacity,
        })?;
    log.flush()?;

    output.emit(json!({ "handle": handle }), || {
        format!("Session ended at {}", handle)
    })
}

/// Record a complete session
pub fn record(config: &LapStoreConfig, output: Output, times: &[LapTime]) -> Result<()> {
    let mut log = open_log(config)?;
    let start = log.record_session(times)?;
    log.flush()?;

    let summary = log.session_summary(start);
    output.emit(json!({ "start": start, "summary": summary }), || {
        format!("Recorded at {}: {}", start, summary_line(&summary))
    })
}

/// Print store-wide totals
pub fn totals(config: &LapStoreConfig, output: Output) -> Result<()> {
    let log = open_log(config)?;
    let totals = log.totals();

    output.emit(json!(totals), || {
        format!(
            "Sessions: {}\nLaps recorded: {}\nLaps remaining: {}",
            totals.sessions, totals.laps_recorded, totals.laps_remaining
        )
    })
}

/// List every session
pub fn sessions(config: &LapStoreConfig, output: Output) -> Result<()> {
    let log = open_log(config)?;
    let sessions: Vec<_> = log.sessions().collect();

    output.emit(json!(sessions), || {
        if sessions.is_empty() {
            return "No sessions".to_string();
        }
        sessions
            .iter()
            .map(|info| {
                format!(
                    "#{} @{}: {}",
                    info.index,
                    info.start,
                    summary_line(&info.summary)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// Summarize one session
pub fn summary(config: &LapStoreConfig, output: Output, session: usize) -> Result<()> {
    let log = open_log(config)?;
    let start = find_session(&log, session)?;
    let summary = log.session_summary(start);

    output.emit(
        json!({ "session": session, "start": start, "summary": summary }),
        || format!("Session {} @{}: {}", session, start, summary_line(&summary)),
    )
}

/// List the laps of one session
pub fn show(config: &LapStoreConfig, output: Output, session: usize) -> Result<()> {
    let log = open_log(config)?;
    let start = find_session(&log, session)?;
    let laps: Vec<_> = log.laps(start).collect();

    let rows: Vec<_> = laps
        .iter()
        .enumerate()
        .map(|(n, (handle, time))| {
            json!({
                "lap": n + 1,
                "handle": handle,
                "time": time,
                "formatted": format_lap_time(*time),
            })
        })
        .collect();

    output.emit(json!({ "session": session, "laps": rows }), || {
        laps.iter()
            .enumerate()
            .map(|(n, (_, time))| format!("{:>3}  {}", n + 1, display_time(*time)))
            .collect::<Vec<_>>()
            .join("\n")
    })
}
