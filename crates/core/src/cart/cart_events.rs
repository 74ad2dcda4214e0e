use serde::{Deserialize, Serialize};

/// User-facing notices emitted after cart operations.
///
/// `pending` marks changes applied locally only, e.g. "added (offline)".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded {
        product_id: String,
        quantity: u32,
        pending: bool,
    },
    QuantityUpdated {
        item_id: String,
        quantity: u32,
        pending: bool,
    },
    ItemRemoved {
        item_id: String,
        pending: bool,
    },
    CartCleared,
    SyncCompleted {
        pushed_count: usize,
        failed: bool,
    },
}

/// Receiver for [`CartEvent`]s. Implementations must not block.
pub trait CartEventSink: Send + Sync {
    fn emit(&self, event: CartEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCartEventSink;

impl CartEventSink for NoOpCartEventSink {
    fn emit(&self, _event: CartEvent) {}
}
