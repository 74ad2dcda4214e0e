use async_trait::async_trait;

use super::cart_model::CartLine;
use crate::errors::Result;

/// Remote cart service contract.
///
/// Each call is a single request with no retry; any transport failure or
/// non-2xx answer surfaces as [`crate::Error::Gateway`].
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// All lines of the session, with product details embedded.
    async fn fetch_cart(&self, session_id: &str) -> Result<Vec<CartLine>>;

    /// Adds `quantity` of a product; the server merges into an existing line.
    async fn add_item(&self, session_id: &str, product_id: &str, quantity: u32)
        -> Result<CartLine>;

    async fn update_quantity(&self, item_id: &str, quantity: u32) -> Result<CartLine>;

    async fn remove_item(&self, item_id: &str) -> Result<()>;

    /// Deletes every line of the session.
    async fn clear_session(&self, session_id: &str) -> Result<()>;
}
