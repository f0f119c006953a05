//! Mock attestation provider.
//!
//! Produces structurally valid payloads with a fixed placeholder signature.
//! Useful anywhere a real attestor is unavailable: tests, demo runs, and the
//! fallback path of [`crate::AttestationService`].

use crate::conditions::conditions_for;
use crate::error::AttestationError;
use crate::provider::AttestationProvider;
use crate::types::{Attestation, Attestor, NetworkRequest, ResponseResolve};
use verity_types::{Address, DataType, Timestamp};

/// The placeholder signature carried by every mock attestation:
/// `0x` followed by 130 zeros (the width of a real 65-byte signature).
pub const MOCK_SIGNATURE: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000";

const MOCK_ATTESTOR_URL: &str = "https://attestor.example.com";

/// Build a mock attestation for `recipient` at the given time.
///
/// The payload passes structural validation but carries no cryptographic
/// weight; validation reports a warning for the placeholder signature.
pub fn mock_attestation(recipient: Address, data_type: DataType, now: Timestamp) -> Attestation {
    let conditions = serde_json::to_string(&conditions_for(data_type))
        .unwrap_or_else(|_| "[]".to_string());
    Attestation {
        recipient,
        request: NetworkRequest {
            url: "https://api.example.com/verify".to_string(),
            header: "{\"Content-Type\": \"application/json\"}".to_string(),
            method: "POST".to_string(),
            body: format!("{{\"type\": \"{data_type}\"}}"),
        },
        response_resolve: vec![ResponseResolve {
            key_name: "verified".to_string(),
            parse_type: "JSON".to_string(),
            parse_path: "$.verified".to_string(),
        }],
        data: format!("verified_{data_type}_data"),
        conditions,
        timestamp: now,
        addition_params: String::new(),
        attestors: vec![Attestor {
            address: Address::new([
                0x12, 0x34, 0x56, 0x78, 0x90, 0x12, 0x34, 0x56, 0x78, 0x90, 0x12, 0x34, 0x56,
                0x78, 0x90, 0x12, 0x34, 0x56, 0x78, 0x90,
            ]),
            url: MOCK_ATTESTOR_URL.to_string(),
        }],
        signatures: vec![MOCK_SIGNATURE.to_string()],
    }
}

/// A drop-in [`AttestationProvider`] backed by [`mock_attestation`].
#[derive(Default)]
pub struct MockAttestor {
    initialized: bool,
}

impl MockAttestor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttestationProvider for MockAttestor {
    async fn initialize(&mut self) -> Result<(), AttestationError> {
        self.initialized = true;
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.initialized
    }

    async fn generate(
        &self,
        data_type: DataType,
        recipient: Address,
    ) -> Result<Attestation, AttestationError> {
        if !self.initialized {
            return Err(AttestationError::Unavailable("mock not initialized".into()));
        }
        Ok(mock_attestation(recipient, data_type, Timestamp::now()))
    }

    async fn verify(&self, attestation: &Attestation) -> Result<bool, AttestationError> {
        // The mock accepts anything it could have produced itself.
        Ok(attestation.signatures.iter().any(|s| s == MOCK_SIGNATURE))
    }

    async fn shutdown(&mut self) -> Result<(), AttestationError> {
        self.initialized = false;
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
