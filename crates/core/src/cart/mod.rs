//! Cart domain models, persistence, and the reconciliation engine.

mod cart_constants;
mod cart_events;
mod cart_model;
mod cart_state;
mod cart_sync_engine;
mod cart_traits;
mod local_cart_store;

pub use cart_constants::*;
pub use cart_events::*;
pub use cart_model::*;
pub use cart_state::*;
pub use cart_sync_engine::*;
pub use cart_traits::*;
pub use local_cart_store::*;
