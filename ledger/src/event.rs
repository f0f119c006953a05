//! The two event kinds the ledger contract emits.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use verity_types::{Address, RequestId, Timestamp, TxHash};

/// Solidity signature of the request event.
pub const REQUESTED_SIGNATURE: &str =
    "VerificationRequested(address,bytes32,string,uint256)";

/// Solidity signature of the completion event.
pub const COMPLETED_SIGNATURE: &str =
    "VerificationCompleted(address,bytes32,bool,uint256)";

/// keccak-256 of an event signature — the log's topic 0.
pub fn event_topic(signature: &str) -> [u8; 32] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut topic = [0u8; 32];
    topic.copy_from_slice(&digest);
    topic
}

/// Emitted when a verification request is accepted by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedEvent {
    /// The account that requested verification (indexed).
    pub user: Address,
    /// Ledger-assigned correlation id (indexed).
    pub request_id: RequestId,
    /// Raw data-category string as stored by the contract.
    pub data_type: String,
    /// Ledger-assigned request time.
    pub timestamp: Timestamp,
    /// Transaction that emitted this event.
    pub tx_hash: TxHash,
    /// Block the event landed in.
    pub block_number: u64,
}

/// Emitted when a verification completes, successfully or not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedEvent {
    pub user: Address,
    pub request_id: RequestId,
    /// Whether the attestation held up.
    pub success: bool,
    pub timestamp: Timestamp,
    pub tx_hash: TxHash,
    pub block_number: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_are_distinct_and_stable() {
        let requested = event_topic(REQUESTED_SIGNATURE);
        let completed = event_topic(COMPLETED_SIGNATURE);
        assert_ne!(requested, completed);
        assert_eq!(requested, event_topic(REQUESTED_SIGNATURE));
    }

    #[test]
    fn events_roundtrip_through_json() {
        let ev = RequestedEvent {
            user: Address::new([1; 20]),
            request_id: RequestId::new([2; 32]),
            data_type: "identity".into(),
            timestamp: Timestamp::new(1_700_000_000),
            tx_hash: TxHash::new([3; 32]),
            block_number: 42,
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: RequestedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }
}
