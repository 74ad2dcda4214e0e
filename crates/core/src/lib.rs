//! Storefront cart core.
//!
//! Holds the cart domain model and the reconciliation engine that keeps a
//! locally persisted cart and a server-side session cart in step. Transport
//! and durable storage are injected through the [`cart::CartGateway`] and
//! [`storage::KeyValueStore`] traits.

pub mod cart;
pub mod connectivity;
pub mod errors;
pub mod session;
pub mod storage;

pub use errors::{Error, Result};
