//! Read-side ledger trait.

use crate::error::LedgerError;
use crate::event::{CompletedEvent, RequestedEvent};
use std::sync::Arc;
use verity_types::{Address, TxHash};

/// Read access to the ledger's event log.
///
/// Implementations query an external node; every call is a suspension point
/// and may fail with [`LedgerError::RateLimited`], which callers are
/// expected to retry with backoff. Block ranges are inclusive on both ends.
#[allow(async_fn_in_trait)]
pub trait LedgerClient {
    /// Current chain height.
    async fn chain_height(&self) -> Result<u64, LedgerError>;

    /// Request events emitted for `user` within `[from_block, to_block]`.
    async fn requested_events(
        &self,
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RequestedEvent>, LedgerError>;

    /// Completion events emitted for `user` within `[from_block, to_block]`.
    async fn completed_events(
        &self,
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<CompletedEvent>, LedgerError>;

    /// The request event emitted by a specific transaction, if any.
    ///
    /// Used after a request confirms to extract the ledger-assigned id;
    /// the returned event's `tx_hash` always equals the argument.
    async fn request_event_by_tx(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<RequestedEvent>, LedgerError>;
}

/// Shared handles read the same ledger.
impl<L: LedgerClient> LedgerClient for Arc<L> {
    async fn chain_height(&self) -> Result<u64, LedgerError> {
        L::chain_height(self).await
    }

    async fn requested_events(
        &self,
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RequestedEvent>, LedgerError> {
        L::requested_events(self, user, from_block, to_block).await
    }

    async fn completed_events(
        &self,
        user: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<CompletedEvent>, LedgerError> {
        L::completed_events(self, user, from_block, to_block).await
    }

    async fn request_event_by_tx(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<RequestedEvent>, LedgerError> {
        L::request_event_by_tx(self, tx_hash).await
    }
}
