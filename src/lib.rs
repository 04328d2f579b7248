//! Self-awareness worksheet - a four-step reflection questionnaire
//!
//! Core modules:
//! - `persistence`: Versioned save/load of answers with legacy migration
//! - `platform`: Browser/native storage and clock abstraction
//! - `form`: Answer schema and the opaque stored record
//! - `worksheet`: Session state driving saves, reset, toasts, celebration
//! - `validation`: Field rules and answer choices
//! - `export`: JSON and text downloads

pub mod error;
pub mod export;
pub mod form;
pub mod persistence;
pub mod platform;
pub mod validation;
pub mod worksheet;

pub use error::{FieldError, StorageError, StoreError};
pub use form::{FormRecord, ScoreField, Step, TextField, WorksheetData};
pub use persistence::{LoadSource, Loaded, PersistenceStore};
pub use platform::{MemoryStorage, StorageProvider};
pub use worksheet::{Toast, Worksheet};

/// Application constants
pub mod consts {
    /// LocalStorage key holding the saved worksheet
    pub const STORAGE_KEY: &str = "selfAwarenessFormData";
    /// Envelope version written by `save`
    pub const SCHEMA_VERSION: u32 = 1;

    /// Toast fades out after this long (ms)
    pub const TOAST_HIDE_MS: f64 = 4000.0;
    /// Toast is removed once the fade finishes (ms)
    pub const TOAST_CLEAR_MS: f64 = 4500.0;
    /// Cheer overlay stays up this long (ms)
    pub const CHEER_DURATION_MS: f64 = 8000.0;
}
