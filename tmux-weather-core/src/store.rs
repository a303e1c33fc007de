//! Durable key → value slots backed by one JSON file per key.
//!
//! An entry's age comes from its file's modification time, which `write`
//! stamps from the store's [`Clock`]. Writes go to a sibling temp file that
//! is renamed over the entry, so a reader sees either the old or the new
//! value, never a partial one.

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::clock::{Clock, SystemClock};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no cache entry for '{key}'")]
    NotFound { key: String },

    #[error("cache entry '{key}' is corrupt")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for cache entry '{key}'")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on cache entry '{key}' ({})", path.display())]
    Io {
        key: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// A stored value and the time it was last written.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub value: T,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EntryStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl EntryStore {
    /// Store rooted at `dir`, stamping entries with wall-clock time.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, Arc::new(SystemClock))
    }

    pub fn with_clock(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self { dir: dir.into(), clock }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read the entry for `key` together with its last-write time.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Entry<T>, StoreError> {
        let path = self.entry_path(key);
        let io_err = |source: io::Error| StoreError::Io {
            key: key.to_string(),
            path: path.clone(),
            source,
        };

        let mut file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { key: key.to_string() });
            }
            Err(err) => return Err(io_err(err)),
        };

        // metadata and contents from the same handle, so a concurrent rename
        // can't pair one entry's bytes with another's timestamp
        let modified = file.metadata().and_then(|m| m.modified()).map_err(io_err)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(io_err)?;

        let value = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Corrupt { key: key.to_string(), source })?;

        Ok(Entry { value, modified: modified.into() })
    }

    /// Replace the entry for `key` with `value`.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|source| StoreError::Encode { key: key.to_string(), source })?;

        let path = self.entry_path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        let result = self.write_stamped(&tmp, &bytes).and_then(|()| fs::rename(&tmp, &path));
        if let Err(source) = result {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Io { key: key.to_string(), path, source });
        }

        tracing::debug!(key, path = %path.display(), "cache entry written");
        Ok(())
    }

    /// Remove the entry for `key`. Missing entries are not an error.
    pub fn erase(&self, key: &str) -> Result<(), StoreError> {
        let path = self.entry_path(key);

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(key, "cache entry erased");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { key: key.to_string(), path, source }),
        }
    }

    fn write_stamped(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(bytes)?;
        // after the data, or the write would bump mtime again
        file.set_modified(self.clock.now().into())?;
        file.sync_all()
    }
}
