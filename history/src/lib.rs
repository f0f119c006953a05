//! Verification history reconstruction.
//!
//! The ledger's event log is the source of truth for a user's verification
//! history. This crate rebuilds it client-side with the minimum number of
//! remote queries: a block-window [`ChainScanner`] paced for rate limits, a
//! per-address [`HistoryCache`] that checkpoints the highest block already
//! read, the pure [`reconcile`] step that joins request and completion
//! events into [`VerificationRecord`]s, and [`HistorySync`] tying the three
//! together.

pub mod cache;
pub mod error;
pub mod reconcile;
pub mod record;
pub mod scanner;
pub mod stats;
pub mod sync;

pub use cache::{BlockCache, CachedEvents, HistoryCache, CACHE_NAMESPACE};
pub use error::HistoryError;
pub use reconcile::reconcile;
pub use record::VerificationRecord;
pub use scanner::{ChainScanner, ScanConfig, ScanOutcome};
pub use stats::{records_by_data_type, records_by_status, HistoryStats};
pub use sync::HistorySync;
