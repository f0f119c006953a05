use thiserror::Error;
use verity_ledger::LedgerError;
use verity_store::StoreError;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("cache serialization error: {0}")]
    Serialization(String),
}
