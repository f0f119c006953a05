use crate::state::FlowStatus;
use thiserror::Error;
use verity_ledger::LedgerError;
use verity_types::{ChainId, TxHash};

#[derive(Debug, Error)]
pub enum FlowError {
    /// No wallet account is connected; nothing was submitted.
    #[error("no wallet connected")]
    NotConnected,

    /// A flow is already in progress on this instance; call `reset()`
    /// before starting a new one.
    #[error("a verification flow is already in progress (status: {0})")]
    AlreadyInFlight(FlowStatus),

    /// The wallet would not move to the ledger's chain.
    #[error("wallet is on chain {actual}, expected {expected}")]
    WrongNetwork { expected: ChainId, actual: ChainId },

    /// The attestation payload failed structural validation; nothing was
    /// submitted.
    #[error("attestation validation failed: {}", .0.join("; "))]
    AttestationInvalid(Vec<String>),

    /// The request confirmed but its event could not be found — the
    /// ledger-assigned id is unknown and the flow will not guess one.
    #[error("request event not found for transaction {0}")]
    EventExtraction(TxHash),

    /// A transaction-layer failure, surfaced verbatim.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
