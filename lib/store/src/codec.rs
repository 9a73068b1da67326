//! Validated object codec — generic save/load primitives over the KV store.

use std::sync::Arc;

use labelforge_kv::{KVError, KVStore};
use serde::Serialize;
use tracing::warn;

use crate::error::PersistError;
use crate::schema::{Document, SchemaError};

/// Generic save/load primitives. Values are stored as JSON bytes; validation
/// runs against the document schema on both write and read.
#[derive(Clone)]
pub struct ObjectCodec {
    kv: Arc<dyn KVStore>,
}

impl ObjectCodec {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    /// Serialize `value` under `key` without validating. `None` deletes the key.
    pub fn save_raw<T: Serialize>(&self, key: &str, value: Option<&T>) -> Result<(), PersistError> {
        match value {
            None => {
                self.kv.delete(key)?;
                Ok(())
            }
            Some(v) => {
                let bytes =
                    serde_json::to_vec(v).map_err(|e| KVError::Serialization(e.to_string()))?;
                self.kv.set(key, &bytes)?;
                Ok(())
            }
        }
    }

    /// Load the JSON value under `key`. Absent keys, unreadable keys, and
    /// unparseable bytes all read as `None`; the failure is logged, not raised.
    pub fn load_raw(&self, key: &str) -> Option<serde_json::Value> {
        let bytes = match self.kv.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("reading '{}' failed, treating as absent: {}", key, e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("value at '{}' is not valid JSON, treating as absent: {}", key, e);
                None
            }
        }
    }

    /// Load and validate the document under `key`. Absence is `Ok(None)`;
    /// a present value that fails its schema propagates as `SchemaError`.
    pub fn load_validated<T: Document>(&self, key: &str) -> Result<Option<T>, SchemaError> {
        match self.load_raw(key) {
            None => Ok(None),
            Some(value) => T::validate(value).map(Some),
        }
    }

    /// Validate, then save. A validation failure happens before any store
    /// mutation, so the prior value under `key` stays intact. `None` deletes.
    pub fn save_validated<T: Document>(
        &self,
        key: &str,
        value: Option<&T>,
    ) -> Result<(), PersistError> {
        let Some(value) = value else {
            return self.save_raw::<T>(key, None);
        };
        value.checked()?;
        self.save_raw(key, Some(value))
    }

    /// Delete `key`, logging instead of failing. Used by self-healing
    /// repositories, where recovery must not raise.
    pub fn discard(&self, key: &str) {
        if let Err(e) = self.kv.delete(key) {
            warn!("discarding '{}' failed: {}", key, e);
        }
    }

    /// Quota-pressure heuristic: `2 * (key length + value length)` summed
    /// over all live keys, floored to kilobytes. Not exact byte accounting.
    pub fn used_space_kb(&self) -> u64 {
        let keys = match self.kv.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("listing keys for space estimate failed: {}", e);
                return 0;
            }
        };
        let mut total = 0u64;
        for key in keys {
            let value_len = match self.kv.get(&key) {
                Ok(Some(bytes)) => bytes.len(),
                _ => 0,
            };
            total += 2 * (key.len() + value_len) as u64;
        }
        total / 1024
    }
}
