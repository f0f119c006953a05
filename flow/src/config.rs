//! Flow configuration with serde defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use verity_types::ChainId;

/// Parameters of the verification flow.
///
/// Can be loaded from a TOML file or built programmatically (e.g. for
/// tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowConfig {
    /// The chain the ledger contract lives on; the wallet is switched here
    /// before any submission.
    #[serde(default = "default_chain")]
    pub chain: ChainId,

    /// Fixed fee attached to the request transaction, in wei.
    #[serde(default = "default_fee_wei")]
    pub fee_wei: u128,

    /// Pause between request confirmation and the completion submission,
    /// covering event-log propagation lag.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// How long to wait for a transaction confirmation before the flow
    /// fails. Bounds a hung wallet.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
}

fn default_chain() -> ChainId {
    ChainId::LOCAL
}

fn default_fee_wei() -> u128 {
    // 0.01 native token.
    10_000_000_000_000_000
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_confirmation_timeout_secs() -> u64 {
    60
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            chain: default_chain(),
            fee_wei: default_fee_wei(),
            settle_delay_ms: default_settle_delay_ms(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
        }
    }
}

impl FlowConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}
