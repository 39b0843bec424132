//! String key-value persistence.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use web_sys::Storage;

use crate::{backend::elements::get_window, error::Error};

/// A string key-value store, written through on every change.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Removes `key`.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        (**self).remove(key)
    }
}

/// The browser's `window.localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Opens the local storage of the current window.
    ///
    /// Fails with [`Error::StorageUnavailable`] when the browser denies
    /// access.
    pub fn new() -> Result<Self, Error> {
        let storage = get_window()?
            .local_storage()
            .ok()
            .flatten()
            .ok_or(Error::StorageUnavailable)?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.storage.get_item(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        Ok(self.storage.set_item(key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        Ok(self.storage.remove_item(key)?)
    }
}

/// An in-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Constructs an empty store.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("key", "value").unwrap();
        assert_eq!(other.get("key").unwrap().as_deref(), Some("value"));
        other.remove("key").unwrap();
        assert!(store.is_empty());
        assert_eq!(store.get("key").unwrap(), None);
    }
}
