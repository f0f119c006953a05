//! The provider trait every attestation backend implements.

use crate::error::AttestationError;
use crate::types::Attestation;
use verity_types::{Address, DataType};

/// A source of attestations.
///
/// Providers have an explicit lifecycle: construct, [`initialize`], use,
/// [`shutdown`]. Construction never performs I/O; availability is an
/// explicit query, not an implicit side effect.
///
/// [`initialize`]: AttestationProvider::initialize
/// [`shutdown`]: AttestationProvider::shutdown
#[allow(async_fn_in_trait)]
pub trait AttestationProvider {
    /// Establish connectivity and decide availability. Idempotent.
    async fn initialize(&mut self) -> Result<(), AttestationError>;

    /// Whether [`generate`](AttestationProvider::generate) can be expected
    /// to succeed. False before `initialize` and after `shutdown`.
    fn is_available(&self) -> bool;

    /// Produce an attestation for `recipient` over the given data category.
    async fn generate(
        &self,
        data_type: DataType,
        recipient: Address,
    ) -> Result<Attestation, AttestationError>;

    /// Check an attestation the provider produced. `Ok(false)` means the
    /// payload is well-formed but did not verify.
    async fn verify(&self, attestation: &Attestation) -> Result<bool, AttestationError>;

    /// Release any provider resources. Idempotent.
    async fn shutdown(&mut self) -> Result<(), AttestationError>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}
