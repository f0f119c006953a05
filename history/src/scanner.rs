//! Block-window event scanning.
//!
//! Scans a block range in fixed-size windows, strictly in increasing order
//! and never concurrently — the sequential order is what makes the cache's
//! `last_queried_block` checkpoint a valid resume point, and the pacing is
//! what keeps public RPC endpoints from shedding us.

use crate::error::HistoryError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};
use verity_ledger::{CompletedEvent, LedgerClient, LedgerError, RequestedEvent};
use verity_types::Address;

/// Scan pacing and retry parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Blocks per window.
    #[serde(default = "default_window_size")]
    pub window_size: u64,

    /// Delay between windows after the first, in milliseconds.
    #[serde(default = "default_window_delay_ms")]
    pub window_delay_ms: u64,

    /// Base backoff delay for a rate-limited window, in milliseconds.
    /// Attempt `n` waits `base × 2^n`.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_delay_ms: u64,

    /// Retries per window after the initial attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_window_size() -> u64 {
    500
}

fn default_window_delay_ms() -> u64 {
    1000
}

fn default_retry_base_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    3
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            window_delay_ms: default_window_delay_ms(),
            retry_base_delay_ms: default_retry_base_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// What a scan produced.
///
/// The scan is best-effort: windows that exhausted their retry budget are
/// listed in `skipped` rather than failing the whole run. A skipped window
/// is not retried on later runs unless the cache is cleared.
#[derive(Clone, Debug, Default)]
pub struct ScanOutcome {
    pub requested: Vec<RequestedEvent>,
    pub completed: Vec<CompletedEvent>,
    /// Inclusive block ranges that were skipped after retry exhaustion.
    pub skipped: Vec<(u64, u64)>,
}

/// Scans the ledger's event log for one user.
pub struct ChainScanner<L> {
    ledger: L,
    config: ScanConfig,
}

impl<L: LedgerClient> ChainScanner<L> {
    pub fn new(ledger: L, config: ScanConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub async fn chain_height(&self) -> Result<u64, HistoryError> {
        Ok(self.ledger.chain_height().await?)
    }

    /// Scan `[from_block, to_block]` for `user`, window by window.
    ///
    /// Windows complete (or are explicitly skipped) strictly in increasing
    /// block order; no two windows are ever in flight at once.
    pub async fn scan(&self, user: Address, from_block: u64, to_block: u64) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        if from_block > to_block {
            return outcome;
        }

        let window_delay = Duration::from_millis(self.config.window_delay_ms);
        let window_size = self.config.window_size.max(1);
        let mut start = from_block;
        let mut first = true;
        loop {
            let end = start.saturating_add(window_size - 1).min(to_block);

            if !first {
                sleep(window_delay).await;
            }
            first = false;

            match self.query_window(user, start, end).await {
                Ok((requested, completed)) => {
                    debug!(
                        from = start,
                        to = end,
                        requested = requested.len(),
                        completed = completed.len(),
                        "window scanned"
                    );
                    outcome.requested.extend(requested);
                    outcome.completed.extend(completed);
                }
                Err(e) => {
                    warn!(from = start, to = end, error = %e, "skipping window");
                    outcome.skipped.push((start, end));
                    // A still-limited endpoint gets extra breathing room
                    // before the next window.
                    if matches!(e, LedgerError::RateLimited) {
                        sleep(window_delay * 2).await;
                    }
                }
            }

            if end >= to_block {
                break;
            }
            start = end + 1;
        }
        outcome
    }

    /// Query one window, backing off on rate limits.
    ///
    /// Both event kinds are fetched as a unit so a skipped window never
    /// leaves a half-read range in the cache.
    async fn query_window(
        &self,
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<(Vec<RequestedEvent>, Vec<CompletedEvent>), LedgerError> {
        let mut attempt: u32 = 0;
        loop {
            match self.query_window_once(user, from_block, to_block).await {
                Ok(events) => return Ok(events),
                Err(LedgerError::RateLimited) if attempt < self.config.max_retries => {
                    let delay =
                        Duration::from_millis(self.config.retry_base_delay_ms << attempt);
                    warn!(
                        from = from_block,
                        to = to_block,
                        attempt = attempt + 1,
                        max = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn query_window_once(
        &self,
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<(Vec<RequestedEvent>, Vec<CompletedEvent>), LedgerError> {
        let requested = self.ledger.requested_events(user, from_block, to_block).await?;
        let completed = self.ledger.completed_events(user, from_block, to_block).await?;
        Ok((requested, completed))
    }
}
