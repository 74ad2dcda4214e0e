//! Key/value table standing in for browser local storage.

mod model;
mod repository;

pub use model::LocalStorageEntryDB;
pub use repository::SqliteKeyValueStore;
