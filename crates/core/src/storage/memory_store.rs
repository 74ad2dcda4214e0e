use std::collections::HashMap;
use std::sync::RwLock;

use super::KeyValueStore;
use crate::errors::{Error, Result};

/// Process-local store. Contents do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        let entries = self
            .entries
            .read()
            .map_err(|_| Error::storage("memory store lock poisoned"))?;
        Ok(entries.contains_key(key))
    }
}
