//! ImageStore: persistent lap storage in a memory-mapped image file.
//!
//! The image is a byte-for-byte copy of what the device keeps in EEPROM:
//! `capacity` 16-bit words, each stored low byte first.
//!
//! ```text
//! offset  0   1   2   3   4   5  ...
//!        [lo  hi][lo  hi][lo  hi]
//!         slot 0  slot 1  slot 2
//! ```
//!
//! A new image is zero-filled, which is the same as all slots empty.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use memmap2::{MmapMut, MmapOptions};
use tracing::{debug, info};

use crate::config::LapStoreConfig;
use crate::lap::LapTime;
use crate::store::LapStore;

/// Bytes per slot in an image.
pub const SLOT_BYTES: usize = 2;

/// Lap store backed by a memory-mapped file.
#[derive(Debug)]
pub struct ImageStore {
    path: PathBuf,
    mmap: MmapMut,
    capacity: usize,
}

impl ImageStore {
    /// Open the image at `path`, creating it if it doesn't exist.
    ///
    /// An existing image must be exactly `capacity * 2` bytes.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if capacity == 0 {
            bail!("image capacity must be at least one slot");
        }
        let len = capacity * SLOT_BYTES;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create image directory: {}", parent.display())
                })?;
            }
        }

        let existed = path.exists();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("failed to open image file: {}", path.display()))?;

        if existed {
            let found = file
                .metadata()
                .context("failed to stat image file")?
                .len();
            if found != len as u64 {
                bail!(
                    "image {} is {} bytes, expected {} for {} slots",
                    path.display(),
                    found,
                    len,
                    capacity
                );
            }
            info!("opened lap image {} ({} slots)", path.display(), capacity);
        } else {
            file.set_len(len as u64)
                .context("failed to set image file size")?;
            info!("created lap image {} ({} slots)", path.display(), capacity);
        }

        let mmap = unsafe {
            MmapOptions::new()
                .len(len)
                .map_mut(&file)
                .context("failed to mmap image file")?
        };

        Ok(Self {
            path,
            mmap,
            capacity,
        })
    }

    /// Open the image described by a configuration.
    pub fn open_config(config: &LapStoreConfig) -> Result<Self> {
        config.validate()?;
        Self::open(&config.image_path, config.capacity)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.mmap
    }
}

impl LapStore for ImageStore {
    fn read(&self, index: usize) -> LapTime {
        let offset = index * SLOT_BYTES;
        LapTime::from_le_bytes([self.mmap[offset], self.mmap[offset + 1]])
    }

    fn write(&mut self, index: usize, value: LapTime) {
        let offset = index * SLOT_BYTES;
        self.mmap[offset..offset + SLOT_BYTES].copy_from_slice(&value.to_le_bytes());
    }

    fn clear(&mut self) {
        self.mmap.fill(0);
        debug!("cleared lap image {}", self.path.display());
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn flush(&mut self) -> Result<()> {
        self.mmap.flush().context("failed to flush image")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_new_image_is_empty() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("laps.img");
        let store = ImageStore::open(&path, 500)?;

        assert_eq!(store.capacity(), 500);
        assert_eq!(std::fs::metadata(&path)?.len(), 1000);
        assert!((0..500).all(|i| store.read(i).is_empty()));

        Ok(())
    }

    #[test]
    fn test_creates_parent_directories() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested").join("dir").join("laps.img");
        ImageStore::open(&path, 4)?;
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn test_little_endian_layout() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = ImageStore::open(temp_dir.path().join("laps.img"), 4)?;

        store.write(1, LapTime::new(0xABCD));
        assert_eq!(&store.bytes()[2..4], &[0xCD, 0xAB]);
        assert_eq!(store.read(1), LapTime::new(0xABCD));

        Ok(())
    }

    #[test]
    fn test_persists_across_reopen() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("laps.img");

        {
            let mut store = ImageStore::open(&path, 10)?;
            store.write(0, LapTime::new(150));
            store.write(1, LapTime::new(200));
            store.flush()?;
        }

        let store = ImageStore::open(&path, 10)?;
        assert_eq!(store.read(0), LapTime::new(150));
        assert_eq!(store.read(1), LapTime::new(200));
        assert_eq!(store.read(2), LapTime::EMPTY);

        let raw = std::fs::read(&path)?;
        assert_eq!(&raw[..4], &[150, 0, 200, 0]);

        Ok(())
    }

    #[test]
    fn test_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = ImageStore::open(temp_dir.path().join("laps.img"), 64)?;

        for h in 0..64 {
            let v = LapTime::new(65534 - (h as u16) * 1000);
            store.write(h, v);
            assert_eq!(store.read(h), v);
        }

        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut store = ImageStore::open(temp_dir.path().join("laps.img"), 8)?;

        for h in 0..8 {
            store.write(h, LapTime::new(1234));
        }
        store.clear();

        assert!(store.bytes().iter().all(|b| *b == 0));
        Ok(())
    }

    #[test]
    fn test_rejects_wrong_size() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("laps.img");
        ImageStore::open(&path, 10)?;

        let result = ImageStore::open(&path, 20);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("expected 40"));

        Ok(())
    }

    #[test]
    fn test_rejects_zero_capacity() -> Result<()> {
        let temp_dir = TempDir::new()?;
        assert!(ImageStore::open(temp_dir.path().join("laps.img"), 0).is_err());
        Ok(())
    }

    #[test]
    fn test_open_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = LapStoreConfig::with_image_path(temp_dir.path().join("cfg.img")).capacity(12);
        let store = ImageStore::open_config(&config)?;
        assert_eq!(store.capacity(), 12);
        assert_eq!(store.path(), config.image_path.as_path());
        Ok(())
    }
}
