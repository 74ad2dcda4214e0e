//! Durable key/value storage contract.
//!
//! Models browser-style local storage: string keys, string values, synchronous
//! access. The cart and session layers only ever talk to this trait so the
//! backend can be swapped (SQLite on native clients, memory in tests).

mod memory_store;

pub use memory_store::InMemoryKeyValueStore;

use crate::errors::Result;

/// A synchronous string key/value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Cheap presence check.
    fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_item(key)?.is_some())
    }
}
