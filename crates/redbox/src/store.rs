// Snapshot store - persisted expected literals keyed by call site
//
// Instead of rewriting test source, recorded snapshots live in a JSON file
// alongside the tests, keyed by (source file, test identifier). The store is
// write-through: a recorded entry hits disk before the assertion passes.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifies one snapshot call site: the test source file plus a test-local
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    file: String,
    test: String,
}

impl SnapshotKey {
    pub fn new(file: impl Into<String>, test: impl Into<String>) -> Result<Self> {
        let key = Self {
            file: file.into(),
            test: test.into(),
        };
        if key.file.is_empty() || key.test.is_empty() {
            return Err(Error::InvalidSnapshotKey(format!(
                "file and test must be non-empty (got '{}', '{}')",
                key.file, key.test
            )));
        }
        Ok(key)
    }

    fn storage_key(&self) -> String {
        format!("{}::{}", self.file, self.test)
    }
}

/// Result of a compare-or-record operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotDecision {
    /// A literal existed for this key and equals the actual value.
    Matched,
    /// No literal existed; the actual value was persisted as the new
    /// expectation.
    Recorded,
    /// A literal existed and differs from the actual value.
    Mismatch { expected: String },
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, String>,
    recorded_this_run: HashSet<String>,
}

/// File-backed key-value store of expected snapshot literals.
///
/// Recording is at-most-once per key per run: once a key holds a value, any
/// later capture for that key compares instead of overwriting, within this
/// process and across runs alike. Concurrent test processes sharing a store
/// file should use per-process store paths.
#[derive(Debug)]
pub struct SnapshotStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl SnapshotStore {
    /// Opens (or initializes) the store at `path`.
    ///
    /// A missing file is an empty store; it is created on first record.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)
                .map_err(|e| Error::from(e).context(format!("corrupt snapshot store {path:?}")))?
        } else {
            BTreeMap::new()
        };
        tracing::debug!(?path, entries = entries.len(), "opened snapshot store");
        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                entries,
                recorded_this_run: HashSet::new(),
            }),
        })
    }

    /// Compares `actual` against the stored literal for `key`, recording it
    /// as the new expectation when none exists.
    pub fn compare_or_record(&self, key: &SnapshotKey, actual: &str) -> Result<SnapshotDecision> {
        let storage_key = key.storage_key();
        let mut inner = self.inner.lock();

        if let Some(expected) = inner.entries.get(&storage_key) {
            if expected == actual {
                return Ok(SnapshotDecision::Matched);
            }
            return Ok(SnapshotDecision::Mismatch {
                expected: expected.clone(),
            });
        }

        inner
            .entries
            .insert(storage_key.clone(), actual.to_string());
        if let Err(e) = self.persist(&inner) {
            // A literal that never reached disk must not count as recorded:
            // a retry would otherwise report Matched against it.
            inner.entries.remove(&storage_key);
            return Err(e);
        }
        inner.recorded_this_run.insert(storage_key.clone());
        tracing::debug!(key = %storage_key, "recorded new snapshot");
        Ok(SnapshotDecision::Recorded)
    }

    /// Whether this process recorded `key` (as opposed to loading it from
    /// disk or never seeing it).
    pub fn recorded_this_run(&self, key: &SnapshotKey) -> bool {
        self.inner
            .lock()
            .recorded_this_run
            .contains(&key.storage_key())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    fn persist(&self, inner: &Inner) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&inner.entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
