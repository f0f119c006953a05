//! Structural attestation validation.
//!
//! Checks the invariants the ledger contract will enforce anyway, so a
//! malformed payload fails fast on the client instead of burning a fee.
//! Errors block submission; warnings are surfaced but do not.

use crate::mock::MOCK_SIGNATURE;
use crate::types::Attestation;
use verity_types::Timestamp;

/// An attestation timestamped further than this into the future is rejected.
pub const MAX_FUTURE_DRIFT_SECS: u64 = 300;

/// An attestation older than this draws a staleness warning.
pub const STALE_AGE_SECS: u64 = 24 * 60 * 60;

/// Outcome of structural validation.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Valid means no errors; warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate an attestation's structure against `now`.
pub fn validate(attestation: &Attestation, now: Timestamp) -> ValidationReport {
    let mut report = ValidationReport::default();

    if attestation.recipient.is_zero() {
        report.errors.push("missing recipient address".into());
    }
    if attestation.data.is_empty() {
        report.errors.push("missing attestation data".into());
    }
    if attestation.timestamp == Timestamp::EPOCH {
        report.errors.push("invalid timestamp".into());
    }
    if attestation.attestors.is_empty() {
        report.errors.push("missing attestors".into());
    }
    if attestation.signatures.is_empty() {
        report.errors.push("missing signatures".into());
    }

    if attestation
        .signatures
        .first()
        .is_some_and(|s| s == MOCK_SIGNATURE)
    {
        report
            .warnings
            .push("using mock signature - this is for testing only".into());
    }

    if attestation.timestamp.ahead_of(now) > MAX_FUTURE_DRIFT_SECS {
        report
            .errors
            .push("attestation timestamp is in the future".into());
    }
    if attestation.timestamp.elapsed_since(now) > STALE_AGE_SECS {
        report
            .warnings
            .push("attestation is older than 24 hours".into());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mock_attestation;
    use verity_types::{Address, DataType};

    fn base(now: Timestamp) -> Attestation {
        mock_attestation(Address::new([0xcc; 20]), DataType::Identity, now)
    }

    #[test]
    fn well_formed_payload_passes() {
        let now = Timestamp::new(1_700_000_000);
        let report = validate(&base(now), now);
        assert!(report.is_valid());
    }

    #[test]
    fn empty_attestors_is_an_error() {
        let now = Timestamp::new(1_700_000_000);
        let mut att = base(now);
        att.attestors.clear();
        let report = validate(&att, now);
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.contains("attestors")));
    }

    #[test]
    fn empty_signatures_is_an_error() {
        let now = Timestamp::new(1_700_000_000);
        let mut att = base(now);
        att.signatures.clear();
        assert!(!validate(&att, now).is_valid());
    }

    #[test]
    fn zero_recipient_is_an_error() {
        let now = Timestamp::new(1_700_000_000);
        let mut att = base(now);
        att.recipient = Address::ZERO;
        assert!(!validate(&att, now).is_valid());
    }

    #[test]
    fn future_timestamp_within_tolerance_passes() {
        let now = Timestamp::new(1_700_000_000);
        let mut att = base(now);
        att.timestamp = Timestamp::new(now.as_secs() + MAX_FUTURE_DRIFT_SECS);
        assert!(validate(&att, now).is_valid());
    }

    #[test]
    fn far_future_timestamp_is_an_error() {
        let now = Timestamp::new(1_700_000_000);
        let mut att = base(now);
        att.timestamp = Timestamp::new(now.as_secs() + MAX_FUTURE_DRIFT_SECS + 1);
        let report = validate(&att, now);
        assert!(report.errors.iter().any(|e| e.contains("future")));
    }

    #[test]
    fn stale_timestamp_warns_but_passes() {
        let now = Timestamp::new(1_700_000_000);
        let mut att = base(now);
        att.timestamp = Timestamp::new(now.as_secs() - STALE_AGE_SECS - 1);
        let report = validate(&att, now);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("older")));
    }

    #[test]
    fn mock_signature_warns_but_passes() {
        let now = Timestamp::new(1_700_000_000);
        let report = validate(&base(now), now);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("mock")));
    }
}
