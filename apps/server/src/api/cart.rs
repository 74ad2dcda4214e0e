//! Session cart endpoints.
//!
//! Lines are returned with the catalog product embedded so clients can price
//! them without a second lookup.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use storefront_core::cart::{CartLine, ProductRef};
use tracing::{debug, info};

use crate::cart_store::{AddOutcome, StoredCartLine};
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemBody {
    pub session_id: String,
    pub product_id: String,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemBody {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub success: bool,
}

fn require(value: &str, what: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", what)));
    }
    Ok(trimmed.to_string())
}

fn to_cart_line(state: &AppState, line: StoredCartLine) -> CartLine {
    let product = state
        .catalog
        .get(&line.product_id)
        .cloned()
        .map_or(ProductRef::Pending, ProductRef::Known);
    CartLine {
        id: line.id,
        session_id: line.session_id,
        product_id: line.product_id,
        quantity: line.quantity,
        product,
    }
}

async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Vec<CartLine>>> {
    let session_id = require(&session_id, "sessionId")?;
    let lines = state.carts.list(&session_id).await;
    debug!("Cart {} has {} lines", session_id, lines.len());
    Ok(Json(
        lines
            .into_iter()
            .map(|line| to_cart_line(&state, line))
            .collect(),
    ))
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddItemBody>,
) -> ApiResult<(StatusCode, Json<CartLine>)> {
    let session_id = require(&body.session_id, "sessionId")?;
    let product_id = require(&body.product_id, "productId")?;
    let quantity = body.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(ApiError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }
    if state.catalog.get(&product_id).is_none() {
        return Err(ApiError::NotFound(format!(
            "Product {} not found",
            product_id
        )));
    }

    let outcome = state.carts.add(&session_id, &product_id, quantity).await;
    let status = match outcome {
        AddOutcome::Created(_) => StatusCode::CREATED,
        AddOutcome::Merged(_) => StatusCode::OK,
    };
    let line = match outcome {
        AddOutcome::Created(line) | AddOutcome::Merged(line) => line,
    };
    info!(
        "Added {} x{} to cart {} (line {}, now x{})",
        product_id, quantity, session_id, line.id, line.quantity
    );
    Ok((status, Json(to_cart_line(&state, line))))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
    Json(body): Json<UpdateItemBody>,
) -> ApiResult<Json<CartLine>> {
    if body.quantity < 1 {
        return Err(ApiError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }
    let line = state
        .carts
        .update_quantity(&item_id, body.quantity)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Cart item {} not found", item_id)))?;
    Ok(Json(to_cart_line(&state, line)))
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<SuccessBody>> {
    if !state.carts.remove(&item_id).await {
        return Err(ApiError::NotFound(format!("Cart item {} not found", item_id)));
    }
    Ok(Json(SuccessBody { success: true }))
}

async fn clear_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SuccessBody>> {
    let session_id = require(&session_id, "sessionId")?;
    let removed = state.carts.clear_session(&session_id).await;
    info!("Cleared {} lines from cart {}", removed, session_id);
    Ok(Json(SuccessBody { success: true }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cart", post(add_item))
        // GET takes a session id, PUT and DELETE an item id
        .route(
            "/cart/:id",
            get(get_cart).put(update_item).delete(delete_item),
        )
        .route("/cart/session/:session_id", delete(clear_session))
}
