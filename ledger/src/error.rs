use thiserror::Error;
use verity_types::{ChainId, TxHash};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The remote endpoint is shedding load; the caller may retry with
    /// backoff. Kept distinct so scan loops can classify it.
    #[error("rate limited by remote endpoint")]
    RateLimited,

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),

    /// The wallet or node refused to broadcast the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The transaction was mined but its execution reverted.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("timed out waiting for confirmation of {0}")]
    ConfirmationTimeout(TxHash),

    #[error("could not switch wallet to chain {0}")]
    SwitchFailed(ChainId),
}
