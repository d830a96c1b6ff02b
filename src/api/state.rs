use std::sync::Arc;

use crate::{
    config::RatePolicy,
    db::Store,
    services::{CatalogProvider, IdentityProvider},
};

/// Shared application state
///
/// Holds handles only; all mutable state lives in the store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub identity: Arc<dyn IdentityProvider>,
    pub rate_policy: RatePolicy,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        catalog: Arc<dyn CatalogProvider>,
        identity: Arc<dyn IdentityProvider>,
        rate_policy: RatePolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            identity,
            rate_policy,
        }
    }
}
