/// Storage key holding the persisted cart snapshot.
pub const CART_STORAGE_KEY: &str = "cart";

/// Delay before the mount-time push-then-pull so the data layer can settle.
pub const DEFAULT_MOUNT_SYNC_DELAY_MS: u64 = 1_000;

/// Quantity used when `add_to_cart` is called without one.
pub const DEFAULT_ADD_QUANTITY: u32 = 1;
