//! Lap store configuration with environment variable and file-based loading.
//!
//! Environment variables:
//! - `LAPTIMER_IMAGE_PATH`: Path of the store image
//! - `LAPTIMER_CAPACITY`: Number of lap slots
//!
//! Default image: `~/.laptimer/laps.img` with 500 slots.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Slot count of the reference device (500 laps in 1000 bytes of EEPROM).
pub const DEFAULT_CAPACITY: usize = 500;

/// Largest capacity whose handles never collide with the invalid handle.
pub const MAX_CAPACITY: usize = u16::MAX as usize;

/// Configuration for a persistent lap store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapStoreConfig {
    /// Image file holding the slots.
    #[serde(default = "default_image_path")]
    pub image_path: PathBuf,

    /// Number of lap slots. Fixed once an image has been created.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for LapStoreConfig {
    fn default() -> Self {
        Self {
            image_path: default_image_path(),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Get the default image path (~/.laptimer/laps.img).
fn default_image_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".laptimer").join("laps.img"))
        .unwrap_or_else(|| PathBuf::from(".laptimer/laps.img"))
}

impl LapStoreConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let image_path = env::var("LAPTIMER_IMAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_image_path());

        let capacity: usize = match env::var("LAPTIMER_CAPACITY") {
            Ok(v) => v
                .trim()
                .parse()
                .with_context(|| format!("invalid LAPTIMER_CAPACITY: {v}"))?,
            Err(_) => DEFAULT_CAPACITY,
        };

        Ok(Self {
            image_path,
            capacity,
        })
    }

    /// Load configuration from a TOML file, falling back to environment.
    ///
    /// The file should contain a `[lapstore]` section:
    /// ```toml
    /// [lapstore]
    /// image_path = "/var/lib/laptimer/laps.img"
    /// capacity = 500
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let table: toml::Table = contents
            .parse()
            .with_context(|| format!("failed to parse TOML: {}", path.display()))?;

        if let Some(section) = table.get("lapstore") {
            let config: LapStoreConfig = section
                .clone()
                .try_into()
                .context("failed to parse [lapstore] section")?;
            Ok(config)
        } else {
            Self::from_env()
        }
    }

    /// Create a config for a specific image path with the default capacity.
    pub fn with_image_path(path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: path.into(),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Replace the capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Check the capacity lies in `1..=MAX_CAPACITY`.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            bail!(
                "capacity {} out of range (1..={})",
                self.capacity,
                MAX_CAPACITY
            );
        }
        Ok(())
    }
}
