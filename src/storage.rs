//! Durable key-value slots that hold serialized snapshots.
//!
//! A slot is addressed by a namespace key and holds one opaque byte blob.
//! [`FileSlotStorage`] keeps each slot as a JSON file on disk:
//!
//! ```text
//! <base_dir>/
//!     <namespace>.json
//!     <namespace>.json.tmp    -- only present mid-write
//! ```
//!
//! [`MemorySlotStorage`] keeps slots in process memory, for tests and for
//! hosts without a writable filesystem.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// A durable location for snapshot bytes, keyed by namespace.
///
/// Implementations must be safe to share across threads. The store
/// serializes its own writes, so implementations need not order concurrent
/// `write` calls for the same key.
pub trait SlotStorage: Send + Sync {
    /// Read the bytes stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` if the slot exists.
    /// - `Ok(None)` if the slot has never been written.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` for failures other than "not found".
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Replace the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if the slot cannot be written.
    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()>;
}

/// File-backed slots rooted at a base directory.
///
/// `Clone` is cheap (it wraps a single `PathBuf`).
#[derive(Debug, Clone)]
pub struct FileSlotStorage {
    base_dir: PathBuf,
}

impl FileSlotStorage {
    /// Create a storage rooted at `base_dir`.
    ///
    /// The directory does not need to exist yet; it is created on the
    /// first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the root directory of this storage.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the file path backing the slot `key`.
    ///
    /// # Returns
    ///
    /// `<base_dir>/<key>.json`
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

/// Reject keys that would resolve outside the base directory.
fn check_key(key: &str) -> io::Result<()> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("slot key {key:?} is not a plain file name"),
        ));
    }
    Ok(())
}

impl SlotStorage for FileSlotStorage {
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        check_key(key)?;
        match std::fs::read(self.slot_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Writes to `<key>.json.tmp` then renames over `<key>.json`, so a
    /// reader never observes a partially written slot.
    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        check_key(key)?;
        std::fs::create_dir_all(&self.base_dir)?;
        let path = self.slot_path(key);
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, bytes)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

/// In-process slots. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemorySlotStorage {
    slots: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySlotStorage {
    /// Create an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage with `key` pre-populated, e.g. to simulate a
    /// snapshot left by an earlier run.
    pub fn with_slot(key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let storage = Self::default();
        if let Ok(mut slots) = storage.slots.write() {
            slots.insert(key.into(), bytes.into());
        }
        storage
    }
}

impl SlotStorage for MemorySlotStorage {
    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let slots = self
            .slots
            .read()
            .map_err(|_| io::Error::other("memory slot lock poisoned"))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| io::Error::other("memory slot lock poisoned"))?;
        slots.insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }
}
