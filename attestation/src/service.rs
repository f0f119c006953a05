//! Primary-with-fallback attestation sourcing.

use crate::error::AttestationError;
use crate::mock::mock_attestation;
use crate::provider::AttestationProvider;
use crate::types::Attestation;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};
use verity_types::{Address, DataType, Timestamp};

/// Where an attestation came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationSource {
    /// The configured provider produced and verified it.
    Provider,
    /// Synthesized locally because the provider was unavailable or its
    /// output failed verification.
    Mock,
}

impl fmt::Display for AttestationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider => f.write_str("provider"),
            Self::Mock => f.write_str("mock"),
        }
    }
}

/// An attestation together with its provenance.
#[derive(Clone, Debug)]
pub struct ObtainedAttestation {
    pub attestation: Attestation,
    pub source: AttestationSource,
}

/// Wraps a provider and guarantees an attestation is always produced:
/// real when the provider cooperates, mock otherwise.
pub struct AttestationService<P> {
    provider: P,
}

impl<P: AttestationProvider> AttestationService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Initialize the underlying provider.
    pub async fn initialize(&mut self) -> Result<(), AttestationError> {
        self.provider.initialize().await
    }

    /// Shut down the underlying provider.
    pub async fn shutdown(&mut self) -> Result<(), AttestationError> {
        self.provider.shutdown().await
    }

    pub fn provider_available(&self) -> bool {
        self.provider.is_available()
    }

    /// Obtain an attestation, preferring the provider and falling back to a
    /// locally synthesized mock payload. The source is always reported;
    /// fallback is never an error.
    pub async fn obtain(&self, data_type: DataType, recipient: Address) -> ObtainedAttestation {
        if self.provider.is_available() {
            match self.provider.generate(data_type, recipient).await {
                Ok(attestation) => match self.provider.verify(&attestation).await {
                    Ok(true) => {
                        info!(provider = self.provider.name(), %data_type, "attestation generated");
                        return ObtainedAttestation {
                            attestation,
                            source: AttestationSource::Provider,
                        };
                    }
                    Ok(false) => {
                        warn!(
                            provider = self.provider.name(),
                            "provider attestation failed verification, falling back to mock"
                        );
                    }
                    Err(e) => {
                        warn!(
                            provider = self.provider.name(),
                            error = %e,
                            "attestation verification errored, falling back to mock"
                        );
                    }
                },
                Err(e) => {
                    warn!(
                        provider = self.provider.name(),
                        error = %e,
                        "attestation generation failed, falling back to mock"
                    );
                }
            }
        } else {
            debug!(provider = self.provider.name(), "provider unavailable, using mock");
        }

        ObtainedAttestation {
            attestation: mock_attestation(recipient, data_type, Timestamp::now()),
            source: AttestationSource::Mock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAttestor;

    /// A provider that claims availability but always fails to generate.
    struct BrokenProvider;

    impl AttestationProvider for BrokenProvider {
        async fn initialize(&mut self) -> Result<(), AttestationError> {
            Ok(())
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            _data_type: DataType,
            _recipient: Address,
        ) -> Result<Attestation, AttestationError> {
            Err(AttestationError::Http("connection reset".into()))
        }

        async fn verify(&self, _attestation: &Attestation) -> Result<bool, AttestationError> {
            Ok(true)
        }

        async fn shutdown(&mut self) -> Result<(), AttestationError> {
            Ok(())
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    /// A provider whose output never verifies.
    struct RejectingProvider;

    impl AttestationProvider for RejectingProvider {
        async fn initialize(&mut self) -> Result<(), AttestationError> {
            Ok(())
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            data_type: DataType,
            recipient: Address,
        ) -> Result<Attestation, AttestationError> {
            Ok(mock_attestation(recipient, data_type, Timestamp::now()))
        }

        async fn verify(&self, _attestation: &Attestation) -> Result<bool, AttestationError> {
            Ok(false)
        }

        async fn shutdown(&mut self) -> Result<(), AttestationError> {
            Ok(())
        }

        fn name(&self) -> &str {
            "rejecting"
        }
    }

    fn recipient() -> Address {
        Address::new([0xbb; 20])
    }

    #[tokio::test]
    async fn healthy_provider_is_preferred() {
        let mut service = AttestationService::new(MockAttestor::new());
        service.initialize().await.unwrap();
        let obtained = service.obtain(DataType::Identity, recipient()).await;
        assert_eq!(obtained.source, AttestationSource::Provider);
    }

    #[tokio::test]
    async fn generation_failure_falls_back_to_mock() {
        let service = AttestationService::new(BrokenProvider);
        let obtained = service.obtain(DataType::Income, recipient()).await;
        assert_eq!(obtained.source, AttestationSource::Mock);
        assert_eq!(obtained.attestation.recipient, recipient());
    }

    #[tokio::test]
    async fn failed_verification_falls_back_to_mock() {
        let service = AttestationService::new(RejectingProvider);
        let obtained = service.obtain(DataType::Education, recipient()).await;
        assert_eq!(obtained.source, AttestationSource::Mock);
    }

    #[tokio::test]
    async fn uninitialized_provider_falls_back_to_mock() {
        let service = AttestationService::new(MockAttestor::new());
        let obtained = service.obtain(DataType::Identity, recipient()).await;
        assert_eq!(obtained.source, AttestationSource::Mock);
    }
}
