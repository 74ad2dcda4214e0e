use std::sync::Arc;

use axum::Router;

use crate::api;
use crate::cart_store::CartRepository;
use crate::catalog::Catalog;

pub struct AppState {
    pub carts: CartRepository,
    pub catalog: Catalog,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            carts: CartRepository::new(),
            catalog,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Catalog::demo())
    }
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new().nest("/api", api::router()).with_state(state)
}
