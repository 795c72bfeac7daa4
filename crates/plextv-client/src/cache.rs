//! Process-local watchlist response cache.
//!
//! One entry per auth token, holding the last entity tag the source issued
//! and the listing decoded from that response. Entries live for the process
//! lifetime; there is no eviction and no size bound. Concurrent calls for
//! the same token race read-decide-write; the last write wins.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::wire::WatchlistContainer;

#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistCacheEntry {
    /// Entity tag from the last fresh listing response, presented back as
    /// `If-None-Match` on the next fetch.
    pub etag: Option<String>,
    pub listing: WatchlistContainer,
}

/// Cloneable handle over the shared cache map. Constructor-injected into the
/// client so tests and callers control its lifetime.
#[derive(Debug, Clone, Default)]
pub struct WatchlistCache {
    entries: Arc<RwLock<HashMap<String, WatchlistCacheEntry>>>,
}

impl WatchlistCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, token: &str) -> Option<WatchlistCacheEntry> {
        self.entries.read().await.get(token).cloned()
    }

    pub async fn set(&self, token: &str, entry: WatchlistCacheEntry) {
        self.entries.write().await.insert(token.to_string(), entry);
    }
}
