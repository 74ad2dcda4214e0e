//! HTTP gateway to the storefront cart API.
//!
//! [`CartApiClient`] speaks the `/api/cart` REST surface and implements
//! [`storefront_core::cart::CartGateway`] so the reconciliation engine can
//! drive it.

mod client;
mod error;
mod types;

pub use client::{CartApiClient, STOREFRONT_API_URL_ENV};
pub use error::{CartClientError, Result};
pub use types::*;
