//! Fundamental types for the Verity client toolkit.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: account addresses, transaction hashes, request identifiers,
//! chain ids, timestamps, and the verification data-type / status enums.

pub mod address;
pub mod chain;
pub mod data_type;
pub mod error;
pub mod hash;
mod hex;
pub mod status;
pub mod time;

pub use address::Address;
pub use chain::ChainId;
pub use data_type::DataType;
pub use error::TypeError;
pub use hash::{RequestId, TxHash};
pub use status::VerificationStatus;
pub use time::Timestamp;
