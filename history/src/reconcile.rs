//! Joining request and completion events into records.

use crate::record::VerificationRecord;
use std::collections::HashMap;
use tracing::warn;
use verity_ledger::{CompletedEvent, RequestedEvent};
use verity_types::{RequestId, VerificationStatus};

/// Reconcile raw event slices into verification records.
///
/// Purely functional over its inputs. Completions are looked up by request
/// id (last write wins on duplicates, which are not expected); a completion
/// with no matching request is ignored, and request events with a zero
/// request id or an unknown data category are dropped defensively. The
/// result holds exactly one record per distinct request id, sorted newest
/// first — the ordering is a user-facing contract.
pub fn reconcile(
    requested: &[RequestedEvent],
    completed: &[CompletedEvent],
) -> Vec<VerificationRecord> {
    let mut completions: HashMap<RequestId, &CompletedEvent> = HashMap::new();
    for event in completed {
        if event.request_id.is_zero() {
            continue;
        }
        completions.insert(event.request_id, event);
    }

    let mut records: HashMap<RequestId, VerificationRecord> = HashMap::new();
    for event in requested {
        if event.request_id.is_zero() {
            continue;
        }
        let Ok(data_type) = event.data_type.parse() else {
            warn!(
                request_id = %event.request_id,
                data_type = %event.data_type,
                "dropping request event with unknown data category"
            );
            continue;
        };
        let status = match completions.get(&event.request_id) {
            Some(completion) if completion.success => VerificationStatus::Verified,
            Some(_) => VerificationStatus::Failed,
            None => VerificationStatus::Pending,
        };
        records.insert(
            event.request_id,
            VerificationRecord {
                request_id: event.request_id,
                data_type,
                status,
                timestamp: event.timestamp,
                tx_hash: event.tx_hash,
                block_number: event.block_number,
            },
        );
    }

    let mut list: Vec<VerificationRecord> = records.into_values().collect();
    // Newest first; block then id break ties so the order is total and the
    // output is identical regardless of input order.
    list.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then(b.block_number.cmp(&a.block_number))
            .then(a.request_id.cmp(&b.request_id))
    });
    list
}
