use std::sync::Arc;

use anyhow::Result;

use crate::{cache::OrderCache, store::OrderStore};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub cache: Arc<OrderCache>,
}

impl AppState {
    pub fn new(store: Arc<dyn OrderStore>, cache_size: usize) -> Result<Self> {
        let cache = OrderCache::new(store.clone(), cache_size)?;
        Ok(Self {
            store,
            cache: Arc::new(cache),
        })
    }
}
