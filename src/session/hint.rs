// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Reconnection Hint
//!
//! The only state that survives a restart: whether the wallet was connected
//! and the last connected address. Stored behind a minimal [`KeyValueStore`].
//!
//! ## Keys
//!
//! ```text
//! <chain id>/walletConnected   "true"
//! <chain id>/walletAddress     bech32 address
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum HintStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Minimal durable key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, HintStoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), HintStoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn clear(&self, key: &str) -> Result<(), HintStoreError>;
}

/// Process-local store, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, HintStoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HintStoreError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), HintStoreError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every write rewrites the whole file through a temp file and a rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, HintStoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), HintStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, entries)?;
            writer.flush()?;
        }

        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, change: F) -> Result<(), HintStoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = self.read_all()?;
        change(&mut entries);
        self.write_all(&entries)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, HintStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HintStoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn clear(&self, key: &str) -> Result<(), HintStoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

/// Reconnection hint for one chain. Storage failures are logged, never
/// returned.
#[derive(Clone)]
pub(crate) struct ReconnectHint {
    store: Arc<dyn KeyValueStore>,
    connected_key: String,
    address_key: String,
}

impl ReconnectHint {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>, chain_id: &str) -> Self {
        Self {
            store,
            connected_key: format!("{chain_id}/walletConnected"),
            address_key: format!("{chain_id}/walletAddress"),
        }
    }

    pub(crate) fn record(&self, address: &str) {
        let result = self
            .store
            .set(&self.connected_key, "true")
            .and_then(|()| self.store.set(&self.address_key, address));
        if let Err(e) = result {
            warn!(address, error = %e, "Failed to persist reconnection hint");
        }
    }

    /// Last connected address, if the wallet was connected.
    pub(crate) fn load(&self) -> Option<String> {
        let read = || -> Result<Option<String>, HintStoreError> {
            if self.store.get(&self.connected_key)?.as_deref() != Some("true") {
                return Ok(None);
            }
            Ok(self.store.get(&self.address_key)?.filter(|a| !a.is_empty()))
        };

        read().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read reconnection hint");
            None
        })
    }

    pub(crate) fn clear(&self) {
        let result = self
            .store
            .clear(&self.connected_key)
            .and_then(|()| self.store.clear(&self.address_key));
        if let Err(e) = result {
            warn!(error = %e, "Failed to clear reconnection hint");
        }
    }
}
