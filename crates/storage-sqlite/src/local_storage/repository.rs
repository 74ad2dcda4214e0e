use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use storefront_core::storage::KeyValueStore;
use storefront_core::Result;

use super::model::LocalStorageEntryDB;
use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::local_storage;

/// [`KeyValueStore`] persisted in the `local_storage` table.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    pool: Arc<DbPool>,
}

impl SqliteKeyValueStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let keys = local_storage::table
            .select(local_storage::storage_key)
            .order(local_storage::storage_key.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let entry = local_storage::table
            .find(key)
            .select(LocalStorageEntryDB::as_select())
            .first::<LocalStorageEntryDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(entry.map(|entry| entry.value))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        let entry = LocalStorageEntryDB {
            storage_key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now().to_rfc3339(),
        };
        diesel::insert_into(local_storage::table)
            .values(&entry)
            .on_conflict(local_storage::storage_key)
            .do_update()
            .set((
                local_storage::value.eq(&entry.value),
                local_storage::updated_at.eq(&entry.updated_at),
            ))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(local_storage::table.find(key))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let found = diesel::select(diesel::dsl::exists(local_storage::table.find(key)))
            .get_result::<bool>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(found)
    }
}
