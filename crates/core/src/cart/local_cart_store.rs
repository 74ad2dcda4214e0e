//! Local persistence of the cart snapshot.
//!
//! Every operation swallows storage failures after logging them: the cart
//! keeps working in memory, it just won't survive a restart.

use chrono::Utc;
use log::{debug, error, warn};
use std::sync::Arc;

use super::cart_constants::CART_STORAGE_KEY;
use super::cart_model::{CartLine, PersistedCartSnapshot};
use super::cart_state::CartState;
use crate::storage::KeyValueStore;

pub struct LocalCartStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl LocalCartStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, CART_STORAGE_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Writes `{items, itemCount, total, timestamp}` for `state`.
    pub fn save(&self, state: &CartState) {
        let snapshot = PersistedCartSnapshot {
            items: state.items().to_vec(),
            item_count: state.item_count(),
            total: state.total(),
            timestamp: Utc::now().timestamp_millis(),
        };

        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(err) => {
                error!("[Cart] Failed to serialize cart snapshot: {}", err);
                return;
            }
        };

        if let Err(err) = self.store.set_item(&self.key, &json) {
            warn!("[Cart] Failed to save cart to local storage: {}", err);
        }
    }

    /// Reads the stored cart.
    ///
    /// Returns `None` when nothing is stored, the JSON is corrupt, or `items`
    /// is not an array. Individual lines that fail to parse are skipped.
    /// Totals are recomputed from the lines rather than trusted.
    pub fn load(&self) -> Option<CartState> {
        let raw = match self.store.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("[Cart] Failed to read cart from local storage: {}", err);
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!("[Cart] Stored cart is not valid JSON: {}", err);
                return None;
            }
        };

        let Some(raw_items) = value.get("items").and_then(|items| items.as_array()) else {
            warn!("[Cart] Stored cart has no items array");
            return None;
        };

        let mut items = Vec::with_capacity(raw_items.len());
        for raw_line in raw_items {
            match serde_json::from_value::<CartLine>(raw_line.clone()) {
                Ok(line) if line.quantity > 0 => items.push(line),
                Ok(line) => debug!("[Cart] Skipping stored line {} with zero quantity", line.id),
                Err(err) => warn!("[Cart] Skipping malformed stored line: {}", err),
            }
        }

        Some(CartState::from_items(items))
    }

    pub fn clear(&self) {
        if let Err(err) = self.store.remove_item(&self.key) {
            warn!("[Cart] Failed to clear cart from local storage: {}", err);
        }
    }

    pub fn exists(&self) -> bool {
        self.store.contains_key(&self.key).unwrap_or_else(|err| {
            warn!("[Cart] Failed to check local cart: {}", err);
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::cart_model::{ProductRef, ProductSnapshot};
    use crate::errors::{Error, Result};
    use crate::storage::InMemoryKeyValueStore;
    use rust_decimal_macros::dec;

    struct FullStore;

    impl KeyValueStore for FullStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::storage("quota exceeded"))
        }
        fn remove_item(&self, _key: &str) -> Result<()> {
            Err(Error::storage("quota exceeded"))
        }
    }

    fn sample_state() -> CartState {
        CartState::from_items(vec![
            CartLine {
                id: "srv-1".to_string(),
                session_id: "s1".to_string(),
                product_id: "A".to_string(),
                quantity: 2,
                product: ProductRef::Known(ProductSnapshot {
                    id: "A".to_string(),
                    name: "Chair".to_string(),
                    price: "49.90".to_string(),
                    images: vec!["chair.jpg".to_string()],
                }),
            },
            CartLine::pending("temp_17".to_string(), "s1", "B", 1),
        ])
    }

    #[test]
    fn save_then_load_restores_lines() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = LocalCartStore::new(kv.clone());
        assert!(!store.exists());
        assert!(store.load().is_none());

        let state = sample_state();
        store.save(&state);
        assert!(store.exists());

        let loaded = store.load().expect("stored cart");
        assert_eq!(loaded.items(), state.items());
        assert_eq!(loaded.item_count(), 3);
        assert_eq!(loaded.total(), dec!(99.80));

        let raw: serde_json::Value =
            serde_json::from_str(&kv.get_item(CART_STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["itemCount"], 3);
        assert!(raw["timestamp"].as_i64().unwrap() > 0);
        assert!(raw["items"][1]["product"].is_null());
    }

    #[test]
    fn corrupt_or_wrong_shape_reads_as_absent() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = LocalCartStore::new(kv.clone());

        kv.set_item(CART_STORAGE_KEY, "{not json").unwrap();
        assert!(store.load().is_none());

        kv.set_item(CART_STORAGE_KEY, r#"{"items":{"a":1}}"#).unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = LocalCartStore::new(kv.clone());
        kv.set_item(
            CART_STORAGE_KEY,
            r#"{"items":[{"id":"temp_1","sessionId":"s","productId":"A","quantity":2,"product":null},
                         {"bogus":true}],"itemCount":99,"total":0,"timestamp":0}"#,
        )
        .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.items().len(), 1);
        assert_eq!(loaded.item_count(), 2);
    }

    #[test]
    fn overflowing_stored_price_loads_as_unpriced() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = LocalCartStore::new(kv.clone());
        kv.set_item(
            CART_STORAGE_KEY,
            r#"{"items":[{"id":"srv-1","sessionId":"s","productId":"A","quantity":2,
                          "product":{"id":"A","name":"Vault","price":"79228162514264337593543950335"}}],
                "itemCount":2,"total":0,"timestamp":0}"#,
        )
        .unwrap();

        let loaded = store.load().expect("stored cart");
        assert_eq!(loaded.item_count(), 2);
        assert_eq!(loaded.total(), dec!(0));
        assert_eq!(loaded.totals().unpriced_lines, 1);
    }

    #[test]
    fn clear_removes_snapshot() {
        let store = LocalCartStore::new(Arc::new(InMemoryKeyValueStore::new()));
        store.save(&sample_state());
        store.clear();
        assert!(!store.exists());
        assert!(store.load().is_none());
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let store = LocalCartStore::new(Arc::new(FullStore));
        store.save(&sample_state());
        store.clear();
        assert!(!store.exists());
    }
}
