//! Key-value option storage used for the persisted watermark and site options.
//!
//! The engine only needs an abstract [`OptionStore`]. Two backends ship with
//! the crate: [`MemoryStore`] for embedding and tests, and [`FileStore`]
//! which keeps options in a TOML file.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use tracing::warn;

use crate::files::lock::{LockError, LockFile};
use crate::migration::Version;

/// Default option key holding the watermark.
pub const DEFAULT_VERSION_KEY: &str = "setver_version";

/// Errors raised by option storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read option store {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write option store {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Option store {} is not valid TOML: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Exclusive hold on a store key. Released on drop.
#[derive(Debug, Default)]
pub struct StoreLock {
    _file: Option<LockFile>,
}

impl StoreLock {
    /// A guard that holds nothing, for stores that cannot be shared.
    pub fn noop() -> Self {
        Self::default()
    }

    pub(crate) fn file(lock: LockFile) -> Self {
        Self { _file: Some(lock) }
    }

    /// True when the guard is backed by a lock file.
    pub fn is_held(&self) -> bool {
        self._file.is_some()
    }
}

/// Abstract key-value persistence.
pub trait OptionStore {
    fn get_option(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn update_option(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether it existed.
    fn delete_option(&mut self, key: &str) -> Result<bool, StoreError>;

    /// Take an exclusive hold on `key` across processes.
    ///
    /// Stores that are private to one process can keep the default no-op.
    fn lock(&mut self, _key: &str) -> Result<StoreLock, StoreError> {
        Ok(StoreLock::noop())
    }
}

/// Parse a stored watermark. Anything that is not a non-negative integer is `None`.
pub fn parse_version(raw: &str) -> Option<Version> {
    raw.trim().parse::<Version>().ok()
}

/// Read the watermark under `key`.
///
/// Absent, empty or unparseable values read as `0`. Only storage failures
/// are errors.
pub fn read_watermark<S: OptionStore + ?Sized>(store: &S, key: &str) -> Result<Version, StoreError> {
    let raw = match store.get_option(key)? {
        Some(raw) => raw,
        None => return Ok(0),
    };
    if raw.trim().is_empty() {
        return Ok(0);
    }
    match parse_version(&raw) {
        Some(version) => Ok(version),
        None => {
            warn!(key, value = %raw, "stored version is not a non-negative integer, treating as 0");
            Ok(0)
        }
    }
}

pub fn write_watermark<S: OptionStore + ?Sized>(
    store: &mut S,
    key: &str,
    version: Version,
) -> Result<(), StoreError> {
    store.update_option(key, &version.to_string())
}

/// Delete the watermark entry. Idempotent.
pub fn clear_watermark<S: OptionStore + ?Sized>(store: &mut S, key: &str) -> Result<bool, StoreError> {
    store.delete_option(key)
}
