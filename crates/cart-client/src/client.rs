//! Cart API client for the storefront REST service.
//!
//! Thin request layer: one HTTP call per operation, no retry. Failures are
//! reported to the caller, which decides whether to fall back to local state.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::time::Duration;

use storefront_core::cart::{CartGateway, CartLine};

use crate::error::{CartClientError, Result};
use crate::types::*;

/// Environment variable holding the API base URL.
pub const STOREFRONT_API_URL_ENV: &str = "STOREFRONT_API_URL";

/// Short fixed timeout; the engine treats a timeout like any other failure.
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Client for the `/api/cart` endpoints.
#[derive(Debug, Clone)]
pub struct CartApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl CartApiClient {
    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("[CartApi] Response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("[CartApi] Response error ({}): {}", status, preview);
    }

    /// Create a new cart API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Origin of the storefront API (e.g., "http://localhost:8088")
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(Self::default_headers())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from `STOREFRONT_API_URL`.
    pub fn from_env() -> Result<Self> {
        std::env::var(STOREFRONT_API_URL_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(|url| Self::new(&url))
            .ok_or_else(|| {
                CartClientError::invalid_request(format!(
                    "{} not configured",
                    STOREFRONT_API_URL_ENV
                ))
            })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/cart{}", self.base_url, path)
    }

    fn require_id<'a>(value: &'a str, what: &str) -> Result<&'a str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CartClientError::invalid_request(format!(
                "{} must not be empty",
                what
            )));
        }
        Ok(trimmed)
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                let message = if error.code.is_empty() {
                    error.message
                } else {
                    format!("{}: {}", error.code, error.message)
                };
                return Err(CartClientError::api(status.as_u16(), message));
            }
            return Err(CartClientError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "[CartApi] Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            CartClientError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    /// Fetch every line of a session.
    ///
    /// GET /api/cart/{sessionId}
    pub async fn get_cart(&self, session_id: &str) -> Result<Vec<CartLine>> {
        let session_id = Self::require_id(session_id, "session id")?;
        let url = self.url(&format!("/{}", urlencoding::encode(session_id)));

        let response = self.client.get(&url).send().await?;
        Self::parse_response(response).await
    }

    /// Add a product; the server merges into an existing line for the product.
    ///
    /// POST /api/cart
    pub async fn add_item(&self, request: &AddCartItemRequest) -> Result<CartLine> {
        Self::require_id(&request.session_id, "session id")?;
        Self::require_id(&request.product_id, "product id")?;
        debug!(
            "[CartApi] Adding {} x{} for session {}",
            request.product_id, request.quantity, request.session_id
        );

        let response = self.client.post(self.url("")).json(request).send().await?;
        Self::parse_response(response).await
    }

    /// Set the quantity of a line.
    ///
    /// PUT /api/cart/{itemId}
    pub async fn update_item(&self, item_id: &str, quantity: u32) -> Result<CartLine> {
        let item_id = Self::require_id(item_id, "item id")?;
        let url = self.url(&format!("/{}", urlencoding::encode(item_id)));

        let response = self
            .client
            .put(&url)
            .json(&UpdateCartItemRequest { quantity })
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Delete one line.
    ///
    /// DELETE /api/cart/{itemId}
    pub async fn delete_item(&self, item_id: &str) -> Result<SuccessResponse> {
        let item_id = Self::require_id(item_id, "item id")?;
        let url = self.url(&format!("/{}", urlencoding::encode(item_id)));

        let response = self.client.delete(&url).send().await?;
        Self::parse_response(response).await
    }

    /// Delete every line of a session.
    ///
    /// DELETE /api/cart/session/{sessionId}
    pub async fn delete_session(&self, session_id: &str) -> Result<SuccessResponse> {
        let session_id = Self::require_id(session_id, "session id")?;
        let url = self.url(&format!("/session/{}", urlencoding::encode(session_id)));

        let response = self.client.delete(&url).send().await?;
        Self::parse_response(response).await
    }
}

#[async_trait]
impl CartGateway for CartApiClient {
    async fn fetch_cart(&self, session_id: &str) -> storefront_core::Result<Vec<CartLine>> {
        Ok(self.get_cart(session_id).await?)
    }

    async fn add_item(
        &self,
        session_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> storefront_core::Result<CartLine> {
        let request = AddCartItemRequest {
            session_id: session_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
        };
        Ok(CartApiClient::add_item(self, &request).await?)
    }

    async fn update_quantity(
        &self,
        item_id: &str,
        quantity: u32,
    ) -> storefront_core::Result<CartLine> {
        Ok(self.update_item(item_id, quantity).await?)
    }

    async fn remove_item(&self, item_id: &str) -> storefront_core::Result<()> {
        self.delete_item(item_id).await?;
        Ok(())
    }

    async fn clear_session(&self, session_id: &str) -> storefront_core::Result<()> {
        self.delete_session(session_id).await?;
        Ok(())
    }
}
