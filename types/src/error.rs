//! Parse errors for the fundamental types.

use thiserror::Error;

/// Errors produced when parsing the fundamental types from strings.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("unknown data type: {0}")]
    InvalidDataType(String),
}
