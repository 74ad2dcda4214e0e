//! SQLite-backed durable storage for native storefront clients.

pub mod db;
pub mod errors;
pub mod local_storage;
pub mod schema;

pub use errors::StorageError;
pub use local_storage::SqliteKeyValueStore;
