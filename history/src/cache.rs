//! Per-address block cache.
//!
//! One entry per user address, keyed under an explicit namespace so cache
//! entries can never collide with other stored state. The entry records the
//! highest block already scanned and the raw events accumulated so far;
//! events are append-only and never re-validated against reorgs (accepted
//! staleness — `clear` is the correction mechanism).

use crate::error::HistoryError;
use serde::{Deserialize, Serialize};
use tracing::warn;
use verity_ledger::{CompletedEvent, RequestedEvent};
use verity_store::KvStore;
use verity_types::Address;

/// Namespace all history cache entries live under.
pub const CACHE_NAMESPACE: &str = "verification_history";

/// Raw events accumulated from prior scans.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEvents {
    pub requested: Vec<RequestedEvent>,
    pub completed: Vec<CompletedEvent>,
}

/// A user's cached scan state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCache {
    /// Highest block height already scanned, inclusive. Monotonically
    /// non-decreasing across saves for a given address.
    pub last_queried_block: u64,
    pub events: CachedEvents,
}

/// Cache entries stored through any [`KvStore`] backend.
pub struct HistoryCache<S> {
    store: S,
}

impl<S: KvStore> HistoryCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the cache entry for `address`.
    ///
    /// A missing, unreadable, or corrupt entry all come back as `None`: the
    /// cache is an optimization, so the worst outcome of losing it is a
    /// re-scan from genesis.
    pub fn load(&self, address: &Address) -> Option<BlockCache> {
        let bytes = match self.store.get(CACHE_NAMESPACE, &address.to_key()) {
            Ok(bytes) => bytes?,
            Err(e) => {
                warn!(%address, error = %e, "failed to load block cache");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(%address, error = %e, "discarding corrupt block cache entry");
                None
            }
        }
    }

    /// Persist the cache entry for `address`.
    pub fn save(&self, address: &Address, cache: &BlockCache) -> Result<(), HistoryError> {
        let bytes = serde_json::to_vec(cache)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;
        self.store.put(CACHE_NAMESPACE, &address.to_key(), &bytes)?;
        Ok(())
    }

    /// Remove the cache entry for `address`. The next scan starts from
    /// genesis.
    pub fn clear(&self, address: &Address) -> Result<(), HistoryError> {
        self.store.delete(CACHE_NAMESPACE, &address.to_key())?;
        Ok(())
    }
}
