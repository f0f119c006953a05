//! Attestation payloads and providers.
//!
//! An attestation is a vendor-defined payload asserting that some off-chain
//! data claim holds for an account. Generating one is delegated to an
//! [`AttestationProvider`]; this crate ships an HTTP-backed provider plus a
//! mock that produces structurally valid, cryptographically meaningless
//! payloads, and the [`AttestationService`] that falls back from one to the
//! other. Structural validation happens here; cryptographic verification is
//! the provider's (and ultimately the ledger's) concern.

pub mod conditions;
pub mod error;
pub mod http;
pub mod mock;
pub mod provider;
pub mod service;
pub mod types;
pub mod validate;

pub use conditions::{conditions_for, Condition, ConditionOp};
pub use error::AttestationError;
pub use http::HttpAttestor;
pub use mock::{mock_attestation, MockAttestor, MOCK_SIGNATURE};
pub use provider::AttestationProvider;
pub use service::{AttestationService, AttestationSource, ObtainedAttestation};
pub use types::{Attestation, Attestor, NetworkRequest, ResponseResolve};
pub use validate::{validate, ValidationReport, MAX_FUTURE_DRIFT_SECS, STALE_AGE_SECS};
