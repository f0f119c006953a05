//! Flow state tracking.

use serde::{Deserialize, Serialize};
use std::fmt;
use verity_attestation::AttestationSource;
use verity_types::{RequestId, TxHash};

/// Phase of an in-flight verification.
///
/// ```text
/// Idle → Requesting → Verifying → Completed
///            │             │
///            └──── Failed ─┘        (reset() from anywhere → Idle)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    #[default]
    Idle,
    /// Phase one: request transaction submitted or confirming.
    Requesting,
    /// Phase two: completion transaction submitted or confirming.
    Verifying,
    Completed,
    Failed,
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Verifying => "verifying",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Snapshot of a flow's progress, cheap to clone for display surfaces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    pub status: FlowStatus,
    /// Advisory progress, 0–100.
    pub progress: u8,
    /// Human-readable phase label.
    pub current_step: String,
    /// Known once the request event is extracted; kept on failure for
    /// diagnostics.
    pub request_id: Option<RequestId>,
    /// Terminal error message, verbatim from the failing layer.
    pub error: Option<String>,
    /// Where the submitted attestation came from.
    pub attestation_source: Option<AttestationSource>,
}

/// Notifications a flow emits for its caller to drain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowEvent {
    /// A non-blocking validation warning was recorded.
    Warning(String),
    /// The request transaction was broadcast.
    RequestSubmitted(TxHash),
    /// The request confirmed and the ledger assigned an id.
    RequestConfirmed(RequestId),
    /// The whole flow finished successfully.
    Completed(RequestId),
    /// The history view should be refreshed to pick up new events.
    HistoryRefreshNeeded,
}
