//! Profile counters derived from reconciled records.

use crate::record::VerificationRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use verity_types::{DataType, Timestamp, VerificationStatus};

/// Aggregate counters over a user's verification history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: usize,
    pub verified: usize,
    pub pending: usize,
    pub failed: usize,
    /// How many distinct data categories appear in the history.
    pub unique_data_types: usize,
    /// Time of the most recent request, if any.
    pub last_verification: Option<Timestamp>,
    /// Verified share of all records, in percent.
    pub success_rate: f64,
}

impl HistoryStats {
    /// Compute counters from a reconciled record list.
    pub fn from_records(records: &[VerificationRecord]) -> Self {
        let total = records.len();
        let verified = records
            .iter()
            .filter(|r| r.status == VerificationStatus::Verified)
            .count();
        let pending = records
            .iter()
            .filter(|r| r.status == VerificationStatus::Pending)
            .count();
        let failed = total - verified - pending;

        let unique_data_types = records
            .iter()
            .map(|r| r.data_type)
            .collect::<HashSet<_>>()
            .len();
        let last_verification = records.iter().map(|r| r.timestamp).max();
        let success_rate = if total > 0 {
            verified as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total,
            verified,
            pending,
            failed,
            unique_data_types,
            last_verification,
            success_rate,
        }
    }
}

/// Records with the given status, preserving order.
pub fn records_by_status(
    records: &[VerificationRecord],
    status: VerificationStatus,
) -> Vec<&VerificationRecord> {
    records.iter().filter(|r| r.status == status).collect()
}

/// Records for the given data category, preserving order.
pub fn records_by_data_type(
    records: &[VerificationRecord],
    data_type: DataType,
) -> Vec<&VerificationRecord> {
    records.iter().filter(|r| r.data_type == data_type).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use verity_types::{RequestId, TxHash};

    fn record(id: u8, data_type: DataType, status: VerificationStatus, ts: u64) -> VerificationRecord {
        VerificationRecord {
            request_id: RequestId::new([id; 32]),
            data_type,
            status,
            timestamp: Timestamp::new(ts),
            tx_hash: TxHash::new([id; 32]),
            block_number: ts,
        }
    }

    #[test]
    fn counters_add_up() {
        let records = vec![
            record(1, DataType::Identity, VerificationStatus::Verified, 100),
            record(2, DataType::Identity, VerificationStatus::Failed, 200),
            record(3, DataType::Income, VerificationStatus::Pending, 300),
            record(4, DataType::Education, VerificationStatus::Verified, 400),
        ];
        let stats = HistoryStats::from_records(&records);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.verified, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.unique_data_types, 3);
        assert_eq!(stats.last_verification, Some(Timestamp::new(400)));
        assert!((stats.success_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_history_has_zero_rate() {
        let stats = HistoryStats::from_records(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.last_verification, None);
    }

    #[test]
    fn filters_respect_order() {
        let records = vec![
            record(1, DataType::Identity, VerificationStatus::Verified, 300),
            record(2, DataType::Income, VerificationStatus::Verified, 200),
            record(3, DataType::Identity, VerificationStatus::Pending, 100),
        ];
        let identity = records_by_data_type(&records, DataType::Identity);
        assert_eq!(identity.len(), 2);
        assert_eq!(identity[0].timestamp, Timestamp::new(300));

        let verified = records_by_status(&records, VerificationStatus::Verified);
        assert_eq!(verified.len(), 2);
    }
}
