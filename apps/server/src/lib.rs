//! Demo storefront cart API.
//!
//! Serves the `/api/cart` REST surface the cart engine talks to, backed by an
//! in-memory cart repository and a small demo product catalog.

pub mod api;
pub mod cart_store;
pub mod catalog;
pub mod config;
pub mod error;
pub mod main_lib;

pub use main_lib::{app_router, AppState};
