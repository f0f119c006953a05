//! The attestation payload submitted alongside a verification request.
//!
//! Field layout mirrors the on-chain attestation struct the ledger contract
//! accepts; this crate treats it as opaque data plus a handful of structural
//! invariants (see [`crate::validate`]).

use serde::{Deserialize, Serialize};
use verity_types::{Address, Timestamp};

/// The network request the attestor replayed to source the claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub url: String,
    pub header: String,
    pub method: String,
    pub body: String,
}

/// How a field of the attested response is located and parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseResolve {
    pub key_name: String,
    pub parse_type: String,
    pub parse_path: String,
}

/// One attestor node that co-signed the payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestor {
    pub address: Address,
    pub url: String,
}

/// A complete attestation payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    /// The account this attestation was issued to.
    pub recipient: Address,
    /// The replayed source request.
    pub request: NetworkRequest,
    /// Extraction rules applied to the source response.
    pub response_resolve: Vec<ResponseResolve>,
    /// The attested claim data.
    pub data: String,
    /// JSON-encoded condition set the claim was checked against.
    pub conditions: String,
    /// When the attestation was produced (epoch seconds).
    pub timestamp: Timestamp,
    /// Vendor-specific extension blob.
    pub addition_params: String,
    /// Attestor nodes that produced the payload.
    pub attestors: Vec<Attestor>,
    /// Hex-encoded signatures, one per attestor.
    pub signatures: Vec<String>,
}
