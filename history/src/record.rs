//! The user-facing verification record.

use serde::{Deserialize, Serialize};
use verity_types::{DataType, RequestId, Timestamp, TxHash, VerificationStatus};

/// One verification attempt, reconciled from the event log.
///
/// Exactly one record exists per distinct request id observed in the
/// request-event stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Ledger-assigned correlation id.
    pub request_id: RequestId,
    pub data_type: DataType,
    pub status: VerificationStatus,
    /// Time of the request event.
    pub timestamp: Timestamp,
    /// Provenance of the request event, for traceability.
    pub tx_hash: TxHash,
    pub block_number: u64,
}
