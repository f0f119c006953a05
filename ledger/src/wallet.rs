//! Write-side wallet trait.

use crate::error::LedgerError;
use std::time::Duration;
use verity_attestation::Attestation;
use verity_types::{Address, ChainId, DataType, RequestId, TxHash};

/// Proof that a transaction was mined and executed successfully.
///
/// A reverted transaction is reported as [`LedgerError::Reverted`], never as
/// a `Receipt`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// The four wallet operations the verification flow needs, plus identity.
///
/// Submission returns as soon as the transaction is broadcast; confirmation
/// is a separate explicit await with a caller-supplied timeout, so a hung
/// signer surfaces as [`LedgerError::ConfirmationTimeout`] instead of
/// stalling the flow forever.
#[allow(async_fn_in_trait)]
pub trait Wallet {
    /// The connected account, if any.
    fn address(&self) -> Option<Address>;

    /// The chain the wallet is currently pointed at.
    fn chain_id(&self) -> ChainId;

    /// Ask the wallet to switch chains. Succeeding means subsequent
    /// [`chain_id`](Wallet::chain_id) calls return `chain`.
    async fn switch_chain(&mut self, chain: ChainId) -> Result<(), LedgerError>;

    /// Broadcast the fee-bearing verification request transaction.
    async fn submit_request(
        &self,
        data_type: DataType,
        attestation: &Attestation,
        fee_wei: u128,
    ) -> Result<TxHash, LedgerError>;

    /// Broadcast the completion transaction for an assigned request id.
    async fn submit_completion(&self, request_id: RequestId) -> Result<TxHash, LedgerError>;

    /// Wait until `tx_hash` is mined or `timeout` elapses.
    async fn wait_for_confirmation(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<Receipt, LedgerError>;
}
