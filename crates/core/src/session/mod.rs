//! Browser-scoped session identity used to key the server-side cart.

mod session_id_provider;

pub use session_id_provider::*;
