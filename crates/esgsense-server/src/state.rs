//! Shared application state.

use esgsense_core::EsgSenseConfig;
use esgsense_store::SqliteStore;

/// State shared by every route handler. Analyses are recomputed from the
/// store on each request.
pub struct AppState {
    pub config: EsgSenseConfig,
    pub store: SqliteStore,
}

impl AppState {
    pub fn new(config: EsgSenseConfig, store: SqliteStore) -> Self {
        Self { config, store }
    }
}
