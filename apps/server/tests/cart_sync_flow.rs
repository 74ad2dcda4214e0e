//! Drives the cart engine through the HTTP client against a live server.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::{json, Value};
use storefront_cart_client::{AddCartItemRequest, CartApiClient};
use storefront_core::cart::{CartSyncEngine, LocalCartStore, MutationOutcome};
use storefront_core::connectivity::ConnectivityMonitor;
use storefront_core::storage::{InMemoryKeyValueStore, KeyValueStore};
use storefront_server::{app_router, AppState};

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_router(Arc::new(AppState::default()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

struct Client {
    api: Arc<CartApiClient>,
    storage: Arc<InMemoryKeyValueStore>,
    connectivity: Arc<ConnectivityMonitor>,
}

impl Client {
    fn new(base_url: &str, online: bool) -> Self {
        Self {
            api: Arc::new(CartApiClient::new(base_url)),
            storage: Arc::new(InMemoryKeyValueStore::new()),
            connectivity: Arc::new(ConnectivityMonitor::new(online)),
        }
    }

    fn engine(&self) -> CartSyncEngine {
        CartSyncEngine::bootstrap(
            self.storage.clone(),
            self.api.clone(),
            self.connectivity.clone(),
        )
        .with_mount_sync_delay(Duration::from_millis(10))
    }
}

#[tokio::test]
async fn online_mutations_mirror_the_server_cart() {
    let base_url = spawn_server().await;
    let client = Client::new(&base_url, true);
    let engine = client.engine();
    assert!(engine.mount().await.is_none());
    assert!(engine.state().is_empty());

    assert_eq!(
        engine.add_to_cart("p-lamp", Some(2)).await.unwrap(),
        MutationOutcome::Synced
    );
    assert_eq!(
        engine.add_to_cart("p-mug", None).await.unwrap(),
        MutationOutcome::Synced
    );
    engine.add_to_cart("p-mug", None).await.unwrap();

    let state = engine.state();
    assert_eq!(state.items().len(), 2);
    assert_eq!(state.item_count(), 4);
    assert_eq!(state.total(), dec!(104.80));
    assert_eq!(state.pending_lines().count(), 0);

    let mug = state
        .items()
        .iter()
        .find(|line| line.product_id == "p-mug")
        .unwrap()
        .clone();
    engine.update_quantity(&mug.id, 5).await.unwrap();
    assert_eq!(engine.state().find_line(&mug.id).unwrap().quantity, 5);

    engine.remove_from_cart(&mug.id).await.unwrap();
    let server_lines = client.api.get_cart(engine.session_id()).await.unwrap();
    assert_eq!(server_lines.len(), 1);
    assert_eq!(server_lines[0].product_id, "p-lamp");
    assert_eq!(engine.state().total(), dec!(79.80));

    engine.clear_cart().await.unwrap();
    assert!(engine.state().is_empty());
    assert!(client
        .api
        .get_cart(engine.session_id())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn offline_lines_are_pushed_and_merged_on_reconnect() {
    let base_url = spawn_server().await;
    let client = Client::new(&base_url, false);
    let engine = Arc::new(client.engine());

    engine.add_to_cart("p-chair", None).await.unwrap();
    engine.add_to_cart("p-chair", Some(2)).await.unwrap();
    engine.add_to_cart("p-rug", None).await.unwrap();

    let offline = engine.state();
    assert_eq!(offline.items().len(), 3);
    assert_eq!(offline.pending_lines().count(), 3);
    assert_eq!(offline.total(), dec!(0));
    assert!(client
        .api
        .get_cart(engine.session_id())
        .await
        .unwrap()
        .is_empty());

    assert!(client.connectivity.set_online(true));
    let report = engine.on_network_online().await.unwrap();
    assert_eq!(report.pushed_count, 3);
    assert!(report.push_error.is_none());
    assert!(report.refreshed);

    let state = engine.state();
    assert_eq!(state.items().len(), 2);
    assert_eq!(state.pending_lines().count(), 0);
    assert_eq!(state.item_count(), 4);
    assert_eq!(state.total(), dec!(666.99));
    let chair = state
        .items()
        .iter()
        .find(|line| line.product_id == "p-chair")
        .unwrap();
    assert_eq!(chair.quantity, 3);
    assert!(!chair.is_temporary());
}

#[tokio::test]
async fn mount_pushes_a_stored_cart_to_a_fresh_server_session() {
    let base_url = spawn_server().await;
    let client = Client::new(&base_url, false);
    let first = client.engine();
    first.add_to_cart("p-mug", Some(3)).await.unwrap();
    let session_id = first.session_id().to_string();
    drop(first);

    client.connectivity.set_online(true);
    let reloaded = client.engine();
    assert_eq!(reloaded.session_id(), session_id);

    let report = reloaded.mount().await.unwrap();
    assert_eq!(report.pushed_count, 1);
    assert!(report.refreshed);

    let state = reloaded.state();
    assert_eq!(state.items().len(), 1);
    assert_eq!(state.items()[0].quantity, 3);
    assert_eq!(state.total(), dec!(37.50));

    let stored = LocalCartStore::new(client.storage.clone()).load().unwrap();
    assert_eq!(stored.items(), state.items());
}

#[tokio::test]
async fn clearing_the_cart_drops_the_stored_snapshot() {
    let base_url = spawn_server().await;
    let client = Client::new(&base_url, true);
    let engine = client.engine();

    engine.add_to_cart("p-lamp", None).await.unwrap();
    assert!(client.storage.contains_key("cart").unwrap());

    engine.clear_cart().await.unwrap();
    assert!(!client.storage.contains_key("cart").unwrap());
    assert!(client.storage.contains_key("sessionId").unwrap());
}

#[tokio::test]
async fn api_rejects_bad_requests_with_error_bodies() {
    let base_url = spawn_server().await;
    let api = CartApiClient::new(&base_url);
    let http = reqwest::Client::new();

    let unknown_product = api
        .add_item(&AddCartItemRequest {
            session_id: "s1".to_string(),
            product_id: "p-missing".to_string(),
            quantity: 1,
        })
        .await
        .unwrap_err();
    assert_eq!(unknown_product.status_code(), Some(404));

    let missing_item = api.update_item("no-such-line", 2).await.unwrap_err();
    assert_eq!(missing_item.status_code(), Some(404));
    let missing_delete = api.delete_item("no-such-line").await.unwrap_err();
    assert_eq!(missing_delete.status_code(), Some(404));

    let line = api
        .add_item(&AddCartItemRequest {
            session_id: "s1".to_string(),
            product_id: "p-mug".to_string(),
            quantity: 1,
        })
        .await
        .unwrap();
    let response = http
        .put(format!("{}/api/cart/{}", base_url, line.id))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("quantity"));

    // omitted quantity defaults to one and merges into the existing line
    let response = http
        .post(format!("{}/api/cart", base_url))
        .json(&json!({ "sessionId": "s1", "productId": "p-mug" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["product"]["price"], "12.50");

    assert!(api.delete_session("s1").await.unwrap().success);
    assert!(api.get_cart("s1").await.unwrap().is_empty());
}
