//! Save/load persistence for worksheet answers
//!
//! Features:
//! - Versioned JSON envelope (`{"v": 1, "data": {...}}`)
//! - Legacy bare-record payloads still load
//! - Shallow merge against current defaults (append-only schema)
//! - Corrupt or missing data falls back to defaults, never an error

pub mod envelope;
pub mod migration;

pub use envelope::{Envelope, Payload};
pub use migration::merge_onto_defaults;

use crate::consts::{SCHEMA_VERSION, STORAGE_KEY};
use crate::error::{StorageError, StoreError};
use crate::form::FormRecord;
use crate::platform::storage::StorageProvider;

/// Where a loaded record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// No durable storage in this context
    Unavailable,
    /// Nothing saved yet
    Empty,
    /// Saved text was unreadable; discarded in favour of defaults
    Corrupt,
    /// Bare record from before the envelope existed
    Legacy,
    /// Current envelope format with its declared version, if any
    Versioned(Option<u64>),
}

impl LoadSource {
    /// Whether any saved answers made it into the record
    pub fn restored(&self) -> bool {
        matches!(self, LoadSource::Legacy | LoadSource::Versioned(_))
    }
}

/// Result of [`PersistenceStore::load_with_source`]
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub record: FormRecord,
    pub source: LoadSource,
}

/// Owner of the single saved-worksheet slot
#[derive(Debug)]
pub struct PersistenceStore<S> {
    provider: S,
    key: String,
}

impl<S: StorageProvider> PersistenceStore<S> {
    /// Store over `provider` using the application's fixed key
    pub fn new(provider: S) -> Self {
        Self::with_key(provider, STORAGE_KEY)
    }

    pub fn with_key(provider: S, key: impl Into<String>) -> Self {
        Self {
            provider,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn provider(&self) -> &S {
        &self.provider
    }

    /// Persist `state` in the current envelope.
    ///
    /// Failures are logged and returned; the previous saved value is left
    /// in place.
    pub fn save(&self, state: &FormRecord) -> Result<(), StoreError> {
        let result = self.try_save(state);
        if let Err(ref e) = result {
            log::error!("Failed to save worksheet: {}", e);
        }
        result
    }

    fn try_save(&self, state: &FormRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(&Envelope::current(state))?;
        self.provider.set_item(&self.key, &json)?;
        log::debug!("Worksheet saved ({} bytes)", json.len());
        Ok(())
    }

    /// Saved answers merged over `defaults`. Always a complete record.
    pub fn load(&self, defaults: &FormRecord) -> FormRecord {
        self.load_with_source(defaults).record
    }

    /// Like [`load`](Self::load), also reporting which payload shape was found
    pub fn load_with_source(&self, defaults: &FormRecord) -> Loaded {
        let fallback = |source| Loaded {
            record: defaults.clone(),
            source,
        };

        let raw = match self.provider.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("No saved worksheet, starting fresh");
                return fallback(LoadSource::Empty);
            }
            Err(StorageError::Unavailable) => {
                log::info!("Storage unavailable, using defaults");
                return fallback(LoadSource::Unavailable);
            }
            Err(e) => {
                log::warn!("Failed to read saved worksheet: {}", e);
                return fallback(LoadSource::Unavailable);
            }
        };

        let (stored, source) = match Payload::parse(&raw) {
            Payload::Versioned { version, data } => {
                if let Some(v) = version.filter(|v| *v > u64::from(SCHEMA_VERSION)) {
                    log::warn!("Saved worksheet is from newer schema v{}", v);
                }
                (data, LoadSource::Versioned(version))
            }
            Payload::Legacy(record) => {
                log::info!("Migrating legacy saved worksheet");
                (record, LoadSource::Legacy)
            }
            Payload::Corrupt => {
                log::warn!("Saved worksheet is corrupt, using defaults");
                return fallback(LoadSource::Corrupt);
            }
        };

        Loaded {
            record: merge_onto_defaults(defaults, stored),
            source,
        }
    }

    /// Delete the saved slot. Clearing an empty slot succeeds.
    pub fn clear(&self) -> Result<(), StoreError> {
        match self.provider.remove_item(&self.key) {
            Ok(()) => {
                log::info!("Saved worksheet cleared");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to clear saved worksheet: {}", e);
                Err(e.into())
            }
        }
    }
}
