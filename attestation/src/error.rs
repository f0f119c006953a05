use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttestationError {
    #[error("attestation provider unavailable: {0}")]
    Unavailable(String),

    #[error("provider transport error: {0}")]
    Http(String),

    #[error("malformed provider response: {0}")]
    InvalidResponse(String),

    #[error("provider configuration error: {0}")]
    Config(String),
}
