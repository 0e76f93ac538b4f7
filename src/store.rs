//! Persisted controller state.
//!
//! Every setter writes through immediately. Tempo is stored per pattern under
//! `last_bpm_<pattern>`, so each pattern comes back with the tempo it was last
//! played at.

use log::warn;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

pub const INPUT_PORT_KEY: &str = "input_port";
pub const OUTPUT_PORT_KEY: &str = "output_port";
pub const PATTERN_KEY: &str = "last_pattern";
pub const PLAYING_KEY: &str = "playing";

/// Path value selecting the in-memory store.
pub const MEMORY_PATH: &str = ":memory:";

pub fn bpm_key(pattern: u32) -> String {
    format!("last_bpm_{}", pattern)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state database error: {0}")]
    Database(#[from] sled::Error),
    #[error("state value for '{key}' could not be encoded: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    fn put(&self, key: &str, value: Value) -> Result<()>;

    fn input_port(&self) -> Option<usize> {
        self.get(INPUT_PORT_KEY)
            .and_then(|v| v.as_u64())
            .and_then(|v| usize::try_from(v).ok())
    }

    fn set_input_port(&self, port: usize) -> Result<()> {
        self.put(INPUT_PORT_KEY, Value::from(port))
    }

    fn output_port(&self) -> Option<usize> {
        self.get(OUTPUT_PORT_KEY)
            .and_then(|v| v.as_u64())
            .and_then(|v| usize::try_from(v).ok())
    }

    fn set_output_port(&self, port: usize) -> Result<()> {
        self.put(OUTPUT_PORT_KEY, Value::from(port))
    }

    /// Last selected flat pattern index, 0 if never set.
    fn pattern(&self) -> u32 {
        self.get(PATTERN_KEY)
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0)
    }

    fn set_pattern(&self, pattern: u32) -> Result<()> {
        self.put(PATTERN_KEY, Value::from(pattern))
    }

    fn bpm_for(&self, pattern: u32) -> Option<u32> {
        self.get(&bpm_key(pattern))
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
    }

    fn set_bpm_for(&self, pattern: u32, bpm: u32) -> Result<()> {
        self.put(&bpm_key(pattern), Value::from(bpm))
    }

    /// Tempo stored for the current pattern.
    fn bpm(&self) -> Option<u32> {
        self.bpm_for(self.pattern())
    }

    /// Stores the tempo under the current pattern.
    fn set_bpm(&self, bpm: u32) -> Result<()> {
        self.set_bpm_for(self.pattern(), bpm)
    }

    fn playing(&self) -> bool {
        self.get(PLAYING_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn set_playing(&self, playing: bool) -> Result<()> {
        self.put(PLAYING_KEY, Value::from(playing))
    }
}

/// sled-backed store, flushed after every write.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        Ok(Self { db })
    }
}

impl StateStore for SledStore {
    fn get(&self, key: &str) -> Option<Value> {
        match self.db.get(key) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring undecodable state value for '{}': {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read state value '{}': {}", key, e);
                None
            }
        }
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        let bytes = serde_json::to_vec(&value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.db.insert(key, bytes)?;
        self.db.flush()?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        match self.values.lock() {
            Ok(values) => values.get(key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(key).cloned(),
        }
    }

    fn put(&self, key: &str, value: Value) -> Result<()> {
        match self.values.lock() {
            Ok(mut values) => values.insert(key.to_string(), value),
            Err(poisoned) => poisoned.into_inner().insert(key.to_string(), value),
        };
        Ok(())
    }
}

/// Opens the sled store at `path`, or the in-memory store for [`MEMORY_PATH`].
pub fn open_store(path: &Path) -> Result<Box<dyn StateStore>> {
    if path == Path::new(MEMORY_PATH) {
        return Ok(Box::new(MemoryStore::new()));
    }
    Ok(Box::new(SledStore::open(path)?))
}
