use log::{debug, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;

use crate::storage::KeyValueStore;

/// Storage key holding the persisted session id.
pub const SESSION_ID_KEY: &str = "sessionId";

const SESSION_ID_LEN: usize = 13;

/// Produces a stable per-installation session id.
///
/// The id is generated on first use and persisted; later calls return the
/// stored value unchanged. There is no expiry or rotation. When storage is
/// unavailable a fresh id is generated on every call.
pub struct SessionIdProvider {
    store: Arc<dyn KeyValueStore>,
}

impl SessionIdProvider {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get_session_id(&self) -> String {
        match self.store.get_item(SESSION_ID_KEY) {
            Ok(Some(existing)) if !existing.trim().is_empty() => return existing,
            Ok(_) => {}
            Err(err) => {
                warn!("[Cart] Session id storage unavailable: {}", err);
                return generate_session_id();
            }
        }

        let session_id = generate_session_id();
        match self.store.set_item(SESSION_ID_KEY, &session_id) {
            Ok(()) => debug!("[Cart] Created session id {}", session_id),
            Err(err) => warn!("[Cart] Failed to persist session id: {}", err),
        }
        session_id
    }
}

/// Short random lowercase alphanumeric token.
pub fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, Result};
    use crate::storage::InMemoryKeyValueStore;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::storage("disabled"))
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::storage("disabled"))
        }
        fn remove_item(&self, _key: &str) -> Result<()> {
            Err(Error::storage("disabled"))
        }
    }

    #[test]
    fn session_id_is_generated_once_and_reused() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let provider = SessionIdProvider::new(store.clone());

        let first = provider.get_session_id();
        assert_eq!(first.len(), SESSION_ID_LEN);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(provider.get_session_id(), first);

        let reopened = SessionIdProvider::new(store);
        assert_eq!(reopened.get_session_id(), first);
    }

    #[test]
    fn blank_stored_id_is_replaced() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        store.set_item(SESSION_ID_KEY, "  ").unwrap();
        let id = SessionIdProvider::new(store.clone()).get_session_id();
        assert_eq!(store.get_item(SESSION_ID_KEY).unwrap(), Some(id));
    }

    #[test]
    fn unavailable_storage_falls_back_to_fresh_ids() {
        let provider = SessionIdProvider::new(Arc::new(BrokenStore));
        let a = provider.get_session_id();
        let b = provider.get_session_id();
        assert_eq!(a.len(), SESSION_ID_LEN);
        assert_ne!(a, b);
    }
}
