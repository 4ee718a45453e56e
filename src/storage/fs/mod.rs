//! Filesystem tier (one JSON record file per key).
//!
//! Records live directly under the cache root with the key as the file name. Writes are
//! staged in [`STAGING_DIR_NAME`] and renamed into place, so readers only ever observe
//! complete records. Expired and corrupt records are removed by whichever read path
//! observes them first.
//!
//! No cross-operation locking is done here: a `get` that evicts an expired record can race
//! a concurrent `put` of the same key, and the fresh record may be removed with it.

/// Filesystem tier error types.
pub mod error;


pub use error::{FsError, FsResult};

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::constants::STAGING_DIR_NAME;
use crate::storage::codec;
use crate::storage::model::{Expiry, FilesystemRecord, Ttl};

#[derive(Clone)]
/// Stores and retrieves expiring records on disk.
pub struct FilesystemTier {
    root: PathBuf,
    clock: Arc<dyn Clock>,
}

/// Result of a single pass over the cache root.
#[derive(Debug, Default)]
struct ScanOutcome {
    live: Vec<(String, FilesystemRecord)>,
    evicted: usize,
}

impl FilesystemTier {
    /// Creates a tier rooted at `root` (the directory is created lazily on first write).
    pub fn new(root: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self { root, clock }
    }

    /// Returns the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current time according to this tier's clock.
    #[inline]
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Ensures the cache root and its staging directory exist.
    pub fn ensure_root(&self) -> FsResult<()> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(FsError::RootUnavailable {
                path: self.root.clone(),
            });
        }
        let staging = self.staging_path();
        if !staging.exists() {
            fs::create_dir_all(&staging).map_err(|_| FsError::RootUnavailable {
                path: self.root.clone(),
            })?;
        }
        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn staging_path(&self) -> PathBuf {
        self.root.join(STAGING_DIR_NAME)
    }

    /// Writes `value` under `key`, expiring `ttl` from now. Overwrites any existing record.
    ///
    /// Returns the absolute expiry that was written.
    pub fn put(&self, key: &str, value: &Value, ttl: Ttl) -> FsResult<Expiry> {
        let expiry = Expiry::from_ttl(ttl, self.clock.now());
        let bytes = codec::encode(value, expiry)?;
        self.write_record(key, &bytes)?;
        debug!(key, expiry = expiry.to_epoch(), "Stored filesystem record");
        Ok(expiry)
    }

    fn write_record(&self, key: &str, bytes: &[u8]) -> FsResult<()> {
        self.ensure_root()?;

        let mut staged = NamedTempFile::new_in(self.staging_path())?;
        staged.write_all(bytes)?;
        staged.as_file().sync_all()?;

        staged
            .persist(self.entry_path(key))
            .map_err(|e| FsError::PersistFailed {
                key: key.to_string(),
                source: e.error,
            })?;
        Ok(())
    }

    /// Reads the live value for `key`.
    ///
    /// Expired or corrupt records are deleted and reported as `None`.
    pub fn get(&self, key: &str) -> FsResult<Option<Value>> {
        Ok(self.get_record(key)?.map(|record| record.data))
    }

    /// Reads the live record (value and absolute expiry) for `key`.
    pub fn get_record(&self, key: &str) -> FsResult<Option<FilesystemRecord>> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(self.admit(key, &path, &bytes, self.clock.now()))
    }

    /// Decodes `bytes` and applies the expiry check, discarding the file on failure.
    fn admit(&self, key: &str, path: &Path, bytes: &[u8], now: i64) -> Option<FilesystemRecord> {
        let record = match codec::decode(bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!(key, error = %e, "Discarding corrupt filesystem record");
                self.discard(key, path);
                return None;
            }
        };

        if record.expiry().is_expired(now) {
            debug!(key, expiry = record.expiry, now, "Evicting expired filesystem record");
            self.discard(key, path);
            return None;
        }

        Some(record)
    }

    fn discard(&self, key: &str, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(key, error = %e, "Failed to remove filesystem record"),
        }
    }

    /// Remaining lifetime of `key`, or `None` if it is absent or has no time left.
    pub fn remaining_ttl(&self, key: &str) -> FsResult<Option<Ttl>> {
        let now = self.clock.now();
        Ok(self
            .get_record(key)?
            .and_then(|record| record.expiry().remaining_ttl(now)))
    }

    /// Deletes the record for `key`. Returns `false` if there was none.
    pub fn delete(&self, key: &str) -> FsResult<bool> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns `true` if a record file exists for `key` (expired or not).
    pub fn exists(&self, key: &str) -> bool {
        self.entry_path(key).is_file()
    }

    /// Lists every live `(key, value)` pair, evicting expired records along the way.
    ///
    /// Single pass, no lock: records written or removed during the scan may or may not
    /// appear. Order follows directory iteration.
    pub fn list_all(&self) -> FsResult<Vec<(String, Value)>> {
        Ok(self
            .scan()?
            .live
            .into_iter()
            .map(|(key, record)| (key, record.data))
            .collect())
    }

    /// Like [`list_all`](Self::list_all) but keeps each record's absolute expiry.
    pub fn list_records(&self) -> FsResult<Vec<(String, FilesystemRecord)>> {
        Ok(self.scan()?.live)
    }

    /// Runs a full scan and returns how many records were evicted.
    pub fn purge_expired(&self) -> FsResult<usize> {
        let outcome = self.scan()?;
        debug!(
            live = outcome.live.len(),
            evicted = outcome.evicted,
            "Filesystem purge complete"
        );
        Ok(outcome.evicted)
    }

    /// Removes every record file and returns the count removed.
    pub fn clear(&self) -> FsResult<usize> {
        let mut removed = 0;
        for (_, path) in self.record_files()? {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }

    fn scan(&self) -> FsResult<ScanOutcome> {
        let now = self.clock.now();
        let mut outcome = ScanOutcome::default();

        for (key, path) in self.record_files()? {
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(key, error = %e, "Skipping unreadable filesystem record");
                    continue;
                }
            };

            match self.admit(&key, &path, &bytes, now) {
                Some(record) => outcome.live.push((key, record)),
                None => outcome.evicted += 1,
            }
        }

        Ok(outcome)
    }

    /// Snapshot of `(key, path)` for every regular file directly under the root.
    fn record_files(&self) -> FsResult<Vec<(String, PathBuf)>> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in dir {
            let Ok(entry) = entry else { continue };

            if let Ok(file_type) = entry.file_type()
                && file_type.is_file()
                && let Some(name) = entry.file_name().to_str()
            {
                files.push((name.to_string(), entry.path()));
            }
        }
        Ok(files)
    }
}

impl std::fmt::Debug for FilesystemTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemTier")
            .field("root", &self.root)
            .finish()
    }
}
