//! End-to-end history synchronization.
//!
//! Ties the cache, scanner, and reconciler together: resume from the cached
//! checkpoint, scan only the blocks not yet seen, merge, persist, reconcile.

use crate::cache::{BlockCache, CachedEvents, HistoryCache};
use crate::error::HistoryError;
use crate::reconcile::reconcile;
use crate::record::VerificationRecord;
use crate::scanner::{ChainScanner, ScanConfig};
use tracing::{debug, info, warn};
use verity_ledger::LedgerClient;
use verity_store::KvStore;
use verity_types::Address;

/// Synchronizes one user's verification history with the chain.
pub struct HistorySync<L, S> {
    scanner: ChainScanner<L>,
    cache: HistoryCache<S>,
}

impl<L: LedgerClient, S: KvStore> HistorySync<L, S> {
    pub fn new(ledger: L, store: S, config: ScanConfig) -> Self {
        Self {
            scanner: ChainScanner::new(ledger, config),
            cache: HistoryCache::new(store),
        }
    }

    /// Bring the cache up to the chain tip and return the reconciled
    /// records, newest first.
    ///
    /// With an up-to-date cache this performs no log queries at all.
    pub async fn refresh(&self, user: Address) -> Result<Vec<VerificationRecord>, HistoryError> {
        let height = self.scanner.chain_height().await?;

        let (mut events, resume_from) = match self.cache.load(&user) {
            Some(cached) if cached.last_queried_block >= height => {
                debug!(
                    %user,
                    block = cached.last_queried_block,
                    "cache is up to date"
                );
                (cached.events, None)
            }
            Some(cached) => {
                debug!(
                    %user,
                    cached_block = cached.last_queried_block,
                    height,
                    "resuming scan from cache checkpoint"
                );
                let resume = cached.last_queried_block + 1;
                (cached.events, Some(resume))
            }
            None => {
                debug!(%user, height, "no cache entry, scanning from genesis");
                (CachedEvents::default(), Some(0))
            }
        };

        if let Some(from_block) = resume_from {
            let outcome = self.scanner.scan(user, from_block, height).await;
            if !outcome.skipped.is_empty() {
                warn!(
                    %user,
                    gaps = ?outcome.skipped,
                    "scan left gaps; they will not be retried until the cache is cleared"
                );
            }
            events.requested.extend(outcome.requested);
            events.completed.extend(outcome.completed);

            let entry = BlockCache {
                last_queried_block: height,
                events: events.clone(),
            };
            if let Err(e) = self.cache.save(&user, &entry) {
                // Persistence is an optimization; the records are still good.
                warn!(%user, error = %e, "failed to persist block cache");
            }
            info!(
                %user,
                height,
                requested = events.requested.len(),
                completed = events.completed.len(),
                "history synchronized"
            );
        }

        Ok(reconcile(&events.requested, &events.completed))
    }

    /// Drop the cached entry for `user`; the next refresh scans from
    /// genesis. This is the only supported correction for a stale or
    /// gap-ridden cache.
    pub fn clear_cache(&self, user: Address) -> Result<(), HistoryError> {
        info!(%user, "clearing block cache");
        self.cache.clear(&user)
    }

    /// Clear the cache and refresh in one step.
    pub async fn force_refresh(
        &self,
        user: Address,
    ) -> Result<Vec<VerificationRecord>, HistoryError> {
        self.clear_cache(user)?;
        self.refresh(user).await
    }
}
