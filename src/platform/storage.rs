//! Durable key-value storage providers
//!
//! The persistence store never touches `window.localStorage` directly; it is
//! handed a provider at construction. Browsers get [`BrowserStorage`], tests
//! and native builds get [`MemoryStorage`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StorageError;

/// Synchronous string key-value storage (the LocalStorage API surface)
pub trait StorageProvider {
    /// Read the text stored under `key`, `Ok(None)` if absent
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete `key`. Deleting an absent key succeeds.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: StorageProvider + ?Sized> StorageProvider for &T {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

impl<T: StorageProvider + ?Sized> StorageProvider for Rc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// In-memory storage with switchable failure modes
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    /// Every call fails with `Unavailable` (non-browser context)
    unavailable: Cell<bool>,
    /// Writes and deletes fail (quota exceeded, storage disabled)
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that behaves like a context without LocalStorage
    pub fn unavailable() -> Self {
        let storage = Self::default();
        storage.unavailable.set(true);
        storage
    }

    /// Storage pre-populated with raw text under `key`
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        storage
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Raw stored text, bypassing failure modes
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.get() {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        self.check_available()?;
        if self.fail_writes.get() {
            Err(StorageError::Write("QuotaExceededError".to_string()))
        } else {
            Ok(())
        }
    }
}

impl StorageProvider for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// `window.localStorage`, if the browser exposes it
#[cfg(target_arch = "wasm32")]
pub struct BrowserStorage {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl BrowserStorage {
    /// Resolve LocalStorage. Never fails; a missing storage surfaces as
    /// `StorageError::Unavailable` on first use.
    pub fn open() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage not available, answers will not be kept");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
fn describe(err: wasm_bindgen::JsValue) -> String {
    use wasm_bindgen::JsCast;
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

#[cfg(target_arch = "wasm32")]
impl StorageProvider for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        // A throwing getItem means access is blocked by policy
        self.storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(describe(e)))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Write(describe(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_basic() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k"), Ok(None));

        storage.set_item("k", "v1").unwrap();
        storage.set_item("k", "v2").unwrap();
        assert_eq!(storage.get_item("k"), Ok(Some("v2".to_string())));
        assert_eq!(storage.len(), 1);

        storage.remove_item("k").unwrap();
        storage.remove_item("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_memory_storage_unavailable() {
        let storage = MemoryStorage::unavailable();
        assert_eq!(storage.get_item("k"), Err(StorageError::Unavailable));
        assert_eq!(storage.set_item("k", "v"), Err(StorageError::Unavailable));
        assert_eq!(storage.remove_item("k"), Err(StorageError::Unavailable));
    }

    #[test]
    fn test_memory_storage_write_failure_keeps_value() {
        let storage = MemoryStorage::with_item("k", "old");
        storage.set_fail_writes(true);

        assert!(matches!(
            storage.set_item("k", "new"),
            Err(StorageError::Write(_))
        ));
        assert!(matches!(storage.remove_item("k"), Err(StorageError::Write(_))));
        // Reads still work
        assert_eq!(storage.get_item("k"), Ok(Some("old".to_string())));
    }

    #[test]
    fn test_shared_provider() {
        let storage = Rc::new(MemoryStorage::new());
        let shared = Rc::clone(&storage);
        shared.set_item("k", "v").unwrap();
        assert_eq!(storage.raw("k").as_deref(), Some("v"));

        let by_ref = &*storage;
        assert_eq!(by_ref.get_item("k"), Ok(Some("v".to_string())));
    }
}
