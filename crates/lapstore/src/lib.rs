//! Lap store: timing sessions over fixed-capacity, headerless lap storage.
//!
//! A lap timer keeps every lap it records in a flat array of 16-bit slots
//! (EEPROM on the device, an image file on a host). Sessions are runs of
//! laps separated by a zero slot; nothing else is stored, so every query
//! rediscovers the session structure by scanning.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lapstore::{format_lap_time, ImageStore, LapStoreConfig, LapTime, SessionLog};
//!
//! let config = LapStoreConfig::from_env().unwrap();
//! let mut log = SessionLog::new(ImageStore::open_config(&config).unwrap());
//!
//! // Start a session and append laps
//! let mut handle = log.create_new_session();
//! for lap in [LapTime::new(8345), LapTime::new(8120)] {
//!     handle = log.add_lap_time(handle, lap);
//!     handle = log.move_next(handle);
//! }
//! log.add_lap_time(handle, LapTime::EMPTY);
//!
//! // Query
//! let totals = log.totals();
//! println!("{} sessions, {} laps", totals.sessions, totals.laps_recorded);
//!
//! let summary = log.session_summary(log.session_handle(0));
//! println!("best {}", format_lap_time(summary.best).unwrap_or_default());
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `LAPTIMER_IMAGE_PATH`: Image file (default: `~/.laptimer/laps.img`)
//! - `LAPTIMER_CAPACITY`: Slot count (default: 500)

pub mod config;
pub mod error;
pub mod format;
pub mod image;
pub mod lap;
pub mod session;
pub mod store;
pub mod summary;

// Re-exports for convenience
pub use config::LapStoreConfig;
pub use error::{LapTimeError, SessionError};
pub use format::{format_lap_time, lap_time_from_millis};
pub use image::ImageStore;
pub use lap::{LapHandle, LapTime};
pub use session::SessionLog;
pub use store::{LapStore, MemoryStore};
pub use summary::{SessionInfo, SessionSummary, Totals};
