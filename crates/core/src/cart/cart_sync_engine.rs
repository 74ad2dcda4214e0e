//! Cart reconciliation engine: optimistic local mutations, server refetch,
//! push-then-pull on reconnect.

use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::cart_constants::{DEFAULT_ADD_QUANTITY, DEFAULT_MOUNT_SYNC_DELAY_MS};
use super::cart_events::{CartEvent, CartEventSink, NoOpCartEventSink};
use super::cart_model::{merge_duplicate_lines, CartLine, TEMP_LINE_ID_PREFIX};
use super::cart_state::CartState;
use super::cart_traits::CartGateway;
use super::local_cart_store::LocalCartStore;
use crate::connectivity::Connectivity;
use crate::errors::{Error, Result};
use crate::session::SessionIdProvider;
use crate::storage::KeyValueStore;

/// How a mutation landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    /// Accepted by the server; state now mirrors the server cart.
    Synced,
    /// Applied locally only; reconciled on the next online transition.
    Pending,
}

/// Result of one push-then-pull run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSyncReport {
    pub pushed_count: usize,
    pub push_error: Option<String>,
    /// True if the canonical server cart was fetched and applied.
    pub refreshed: bool,
}

/// Monotonic `temp_<millis>` ids; never repeats within a process even when
/// called twice in the same millisecond.
#[derive(Debug, Default)]
struct TempLineIds {
    last: AtomicI64,
}

impl TempLineIds {
    fn next(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(now.max(prev + 1))
            })
            .unwrap_or(now - 1);
        format!("{}{}", TEMP_LINE_ID_PREFIX, now.max(previous + 1))
    }
}

/// Keeps `is_loading` accurate even if a fetch future is dropped mid-flight.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Reconciles the locally persisted cart with the server-side session cart.
///
/// Every applied change (local load, optimistic mutation, clear, server
/// replace) is stamped with a tick from one monotonic counter. A fetch takes
/// its tick when it is issued and its response is applied only if no newer
/// change has landed since, so a late response can never roll the cart back.
pub struct CartSyncEngine {
    session_id: String,
    gateway: Arc<dyn CartGateway>,
    local_store: LocalCartStore,
    connectivity: Arc<dyn Connectivity>,
    event_sink: Arc<dyn CartEventSink>,
    state: RwLock<CartState>,
    ticks: AtomicU64,
    in_flight_fetches: AtomicUsize,
    temp_ids: TempLineIds,
    mount_sync_delay: Duration,
}

impl CartSyncEngine {
    pub fn new(
        session_id: impl Into<String>,
        gateway: Arc<dyn CartGateway>,
        local_store: LocalCartStore,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            gateway,
            local_store,
            connectivity,
            event_sink: Arc::new(NoOpCartEventSink),
            state: RwLock::new(CartState::empty()),
            ticks: AtomicU64::new(0),
            in_flight_fetches: AtomicUsize::new(0),
            temp_ids: TempLineIds::default(),
            mount_sync_delay: Duration::from_millis(DEFAULT_MOUNT_SYNC_DELAY_MS),
        }
    }

    /// Builds an engine whose session id and cart snapshot share one store.
    pub fn bootstrap(
        storage: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn CartGateway>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        let session_id = SessionIdProvider::new(Arc::clone(&storage)).get_session_id();
        Self::new(
            session_id,
            gateway,
            LocalCartStore::new(storage),
            connectivity,
        )
    }

    /// Sets the sink receiving user-facing cart notices.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn CartEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn with_mount_sync_delay(mut self, delay: Duration) -> Self {
        self.mount_sync_delay = delay;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current cart.
    pub fn state(&self) -> CartState {
        self.read_state().clone()
    }

    /// True while a canonical cart fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight_fetches.load(Ordering::SeqCst) > 0
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Startup: show the stored cart immediately, then fetch the server cart.
    ///
    /// When a non-empty cart was stored and the network is up, the stored
    /// lines are also pushed to the server (after the mount delay) and the
    /// canonical cart pulled back. Returns that sync's report, if it ran.
    pub async fn mount(&self) -> Option<CartSyncReport> {
        let stored_items = match self.local_store.load() {
            Some(stored) if !stored.is_empty() => {
                let items = stored.into_items();
                let tick = self.next_tick();
                self.write_state().replace_items(items.clone(), tick);
                debug!("[Cart] Restored {} line(s) from local storage", items.len());
                Some(items)
            }
            _ => None,
        };

        let push_items = stored_items.filter(|_| self.connectivity.is_online());

        let initial_fetch = async {
            if let Err(err) = self.refresh().await {
                warn!("[Cart] Initial cart fetch failed: {}", err);
            }
        };
        let delayed_sync = async {
            match push_items {
                Some(items) => {
                    tokio::time::sleep(self.mount_sync_delay).await;
                    Some(self.push_then_pull(items).await)
                }
                None => None,
            }
        };

        let ((), report) = tokio::join!(initial_fetch, delayed_sync);
        report
    }

    /// Connectivity came back: push whatever is stored locally.
    pub async fn on_network_online(&self) -> Option<CartSyncReport> {
        let stored = self.local_store.load()?;
        if stored.is_empty() {
            debug!("[Cart] Back online with an empty local cart, nothing to push");
            return None;
        }
        info!("[Cart] Back online, reconciling local cart with server");
        Some(self.push_then_pull(stored.into_items()).await)
    }

    /// Runs [`Self::on_network_online`] on every offline -> online edge of
    /// `online_rx`. Stops when the sender is dropped.
    pub fn spawn_online_listener(
        self: &Arc<Self>,
        mut online_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut was_online = *online_rx.borrow_and_update();
        tokio::spawn(async move {
            while online_rx.changed().await.is_ok() {
                let online = *online_rx.borrow_and_update();
                if online && !was_online {
                    if let Some(report) = engine.on_network_online().await {
                        debug!(
                            "[Cart] Reconnect sync pushed={} refreshed={} error={:?}",
                            report.pushed_count, report.refreshed, report.push_error
                        );
                    }
                }
                was_online = online;
            }
        })
    }

    /// Fetches the server cart and replaces local state with it.
    ///
    /// Returns `Ok(false)` when the response was stale and dropped.
    pub async fn refresh(&self) -> Result<bool> {
        let tick = self.next_tick();
        let items = {
            let _loading = InFlight::enter(&self.in_flight_fetches);
            self.gateway.fetch_cart(&self.session_id).await?
        };
        Ok(self.apply_server_items(items, tick))
    }

    /// Destructive sync: clear the server session, re-add `items` one by one,
    /// then pull the canonical cart regardless of how the push went.
    ///
    /// A failing step stops the push; lines already pushed stay on the server.
    pub async fn push_then_pull(&self, items: Vec<CartLine>) -> CartSyncReport {
        let mut pushed_count = 0;
        let mut push_error = None;

        match self.gateway.clear_session(&self.session_id).await {
            Ok(()) => {
                for line in items
                    .iter()
                    .filter(|line| !line.product_id.is_empty() && line.quantity > 0)
                {
                    match self
                        .gateway
                        .add_item(&self.session_id, &line.product_id, line.quantity)
                        .await
                    {
                        Ok(_) => pushed_count += 1,
                        Err(err) => {
                            warn!(
                                "[Cart] Push of product {} failed after {} line(s): {}",
                                line.product_id, pushed_count, err
                            );
                            push_error = Some(err.to_string());
                            break;
                        }
                    }
                }
            }
            Err(err) => {
                warn!("[Cart] Failed to clear server cart before push: {}", err);
                push_error = Some(err.to_string());
            }
        }

        let refreshed = match self.refresh().await {
            Ok(applied) => applied,
            Err(err) => {
                warn!("[Cart] Fetch after push failed: {}", err);
                false
            }
        };

        self.event_sink.emit(CartEvent::SyncCompleted {
            pushed_count,
            failed: push_error.is_some() || !refreshed,
        });

        CartSyncReport {
            pushed_count,
            push_error,
            refreshed,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds `quantity` (default 1) of a product.
    ///
    /// Never fails for transport reasons: if the server cannot be reached the
    /// line is appended locally with a `temp_` id and no product details.
    pub async fn add_to_cart(
        &self,
        product_id: &str,
        quantity: Option<u32>,
    ) -> Result<MutationOutcome> {
        let quantity = quantity.unwrap_or(DEFAULT_ADD_QUANTITY);
        if product_id.trim().is_empty() {
            return Err(Error::invalid_input("product id is required"));
        }
        if quantity == 0 {
            return Err(Error::invalid_input("quantity must be at least 1"));
        }

        if self.connectivity.is_online() {
            let result = self
                .gateway
                .add_item(&self.session_id, product_id, quantity)
                .await;
            if self.settle_remote("add", result.map(|_| ())).await {
                self.event_sink.emit(CartEvent::ItemAdded {
                    product_id: product_id.to_string(),
                    quantity,
                    pending: false,
                });
                return Ok(MutationOutcome::Synced);
            }
        }

        let line = CartLine::pending(self.temp_ids.next(), &self.session_id, product_id, quantity);
        debug!("[Cart] Adding {} locally as {}", product_id, line.id);
        self.commit_local(|state, tick| {
            state.push_line(line, tick);
            true
        });
        self.event_sink.emit(CartEvent::ItemAdded {
            product_id: product_id.to_string(),
            quantity,
            pending: true,
        });
        Ok(MutationOutcome::Pending)
    }

    /// Sets a line's quantity. Zero removes the line.
    pub async fn update_quantity(&self, item_id: &str, quantity: u32) -> Result<MutationOutcome> {
        if quantity == 0 {
            return self.remove_from_cart(item_id).await;
        }

        if self.connectivity.is_online() {
            let result = self.gateway.update_quantity(item_id, quantity).await;
            if self.settle_remote("update", result.map(|_| ())).await {
                self.event_sink.emit(CartEvent::QuantityUpdated {
                    item_id: item_id.to_string(),
                    quantity,
                    pending: false,
                });
                return Ok(MutationOutcome::Synced);
            }
        }

        let changed = self.commit_local(|state, tick| state.set_quantity(item_id, quantity, tick));
        if changed {
            self.event_sink.emit(CartEvent::QuantityUpdated {
                item_id: item_id.to_string(),
                quantity,
                pending: true,
            });
        } else {
            debug!("[Cart] No local line {} to update", item_id);
        }
        Ok(MutationOutcome::Pending)
    }

    pub async fn remove_from_cart(&self, item_id: &str) -> Result<MutationOutcome> {
        if self.connectivity.is_online() {
            let result = self.gateway.remove_item(item_id).await;
            if self.settle_remote("remove", result).await {
                self.event_sink.emit(CartEvent::ItemRemoved {
                    item_id: item_id.to_string(),
                    pending: false,
                });
                return Ok(MutationOutcome::Synced);
            }
        }

        let changed = self.commit_local(|state, tick| state.remove_line(item_id, tick));
        if changed {
            self.event_sink.emit(CartEvent::ItemRemoved {
                item_id: item_id.to_string(),
                pending: true,
            });
        } else {
            debug!("[Cart] No local line {} to remove", item_id);
        }
        Ok(MutationOutcome::Pending)
    }

    /// Empties the cart. The server must confirm before the local copy is
    /// dropped; on failure nothing local changes and the error is returned.
    pub async fn clear_cart(&self) -> Result<()> {
        if let Err(err) = self.gateway.clear_session(&self.session_id).await {
            warn!("[Cart] Clear rejected by server, keeping local cart: {}", err);
            return Err(err);
        }

        let tick = self.next_tick();
        {
            let mut state = self.write_state();
            self.local_store.clear();
            state.replace_items(Vec::new(), tick);
        }
        info!("[Cart] Cleared cart for session {}", self.session_id);
        self.event_sink.emit(CartEvent::CartCleared);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn next_tick(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CartState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CartState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// After a remote mutation: on success refetch the canonical cart.
    /// Returns false when the caller should fall back to a local mutation.
    async fn settle_remote(&self, operation: &str, result: Result<()>) -> bool {
        if let Err(err) = result {
            warn!("[Cart] Remote {} failed, applying locally: {}", operation, err);
            return false;
        }
        match self.refresh().await {
            Ok(_) => true,
            Err(err) => {
                warn!(
                    "[Cart] Refetch after {} failed, applying locally: {}",
                    operation, err
                );
                false
            }
        }
    }

    /// Applies a local change under a fresh tick and persists the result.
    ///
    /// Storage is written before the state lock is released so snapshots land
    /// in the same order as the changes they record.
    fn commit_local<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut CartState, u64) -> bool,
    {
        let tick = self.next_tick();
        let mut state = self.write_state();
        if !mutate(&mut state, tick) {
            return false;
        }
        self.persist(&state);
        true
    }

    fn apply_server_items(&self, items: Vec<CartLine>, tick: u64) -> bool {
        let mut state = self.write_state();
        if state.version() > tick {
            debug!(
                "[Cart] Dropping stale cart response (requested at {}, state at {})",
                tick,
                state.version()
            );
            return false;
        }
        state.replace_items(merge_duplicate_lines(items), tick);
        self.persist(&state);
        true
    }

    /// Writes the snapshot unless the cart is empty and nothing was stored
    /// before, so a cleared cart does not recreate the storage key.
    /// Callers hold the state write lock.
    fn persist(&self, state: &CartState) {
        if !state.is_empty() || self.local_store.exists() {
            self.local_store.save(state);
        }
    }
}
