//! HTTP-backed attestation provider.
//!
//! Talks to a remote attestor service over a small REST surface:
//! `GET /health` (availability), `POST /attestations` (generate), and
//! `POST /attestations/verify` (verify). The service is expected to be
//! frequently unavailable in development; callers should pair this provider
//! with the mock fallback in [`crate::AttestationService`].

use crate::conditions::conditions_for;
use crate::error::AttestationError;
use crate::provider::AttestationProvider;
use crate::types::Attestation;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use verity_types::{Address, DataType};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Template identifier the attestor service expects per data category.
fn template_for(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Identity => "identity-template",
        DataType::Income => "income-template",
        DataType::CreditScore => "credit-template",
        DataType::SocialMedia => "social-template",
        DataType::Education => "education-template",
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    template_id: &'a str,
    recipient: Address,
    data_type: DataType,
    conditions: Vec<crate::conditions::Condition>,
    app_id: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    valid: bool,
}

/// An [`AttestationProvider`] backed by a remote attestor REST service.
pub struct HttpAttestor {
    base_url: String,
    client: reqwest::Client,
    app_id: String,
    available: bool,
}

impl HttpAttestor {
    /// Create a provider for the attestor at `base_url`.
    ///
    /// No I/O happens here; call [`AttestationProvider::initialize`] before
    /// use.
    pub fn new(base_url: &str, app_id: &str) -> Result<Self, AttestationError> {
        if app_id.is_empty() {
            return Err(AttestationError::Config("empty app id".into()));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            app_id: app_id.to_string(),
            available: false,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl AttestationProvider for HttpAttestor {
    /// Probe the service's health endpoint and record availability.
    ///
    /// An unreachable service is not an error — the provider simply reports
    /// unavailable so callers can fall back.
    async fn initialize(&mut self) -> Result<(), AttestationError> {
        let url = format!("{}/health", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                debug!(%url, "attestor service is healthy");
                self.available = true;
            }
            Ok(resp) => {
                warn!(%url, status = %resp.status(), "attestor health check failed");
                self.available = false;
            }
            Err(e) => {
                warn!(%url, error = %e, "attestor service unreachable");
                self.available = false;
            }
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn generate(
        &self,
        data_type: DataType,
        recipient: Address,
    ) -> Result<Attestation, AttestationError> {
        if !self.available {
            return Err(AttestationError::Unavailable(self.base_url.clone()));
        }
        let url = format!("{}/attestations", self.base_url);
        let body = GenerateRequest {
            template_id: template_for(data_type),
            recipient,
            data_type,
            conditions: conditions_for(data_type),
            app_id: &self.app_id,
        };

        let resp = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| AttestationError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AttestationError::Http(format!(
                "HTTP {} from {}",
                resp.status(),
                url
            )));
        }

        resp.json()
            .await
            .map_err(|e| AttestationError::InvalidResponse(e.to_string()))
    }

    async fn verify(&self, attestation: &Attestation) -> Result<bool, AttestationError> {
        if !self.available {
            return Err(AttestationError::Unavailable(self.base_url.clone()));
        }
        let url = format!("{}/attestations/verify", self.base_url);
        let resp = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(attestation)
            .send()
            .await
            .map_err(|e| AttestationError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AttestationError::Http(format!(
                "HTTP {} from {}",
                resp.status(),
                url
            )));
        }

        let verdict: VerifyResponse = resp
            .json()
            .await
            .map_err(|e| AttestationError::InvalidResponse(e.to_string()))?;
        Ok(verdict.valid)
    }

    async fn shutdown(&mut self) -> Result<(), AttestationError> {
        self.available = false;
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let provider = HttpAttestor::new("https://attestor.example.com/", "app").unwrap();
        assert_eq!(provider.base_url(), "https://attestor.example.com");
    }

    #[test]
    fn empty_app_id_is_rejected() {
        assert!(HttpAttestor::new("https://attestor.example.com", "").is_err());
    }

    #[tokio::test]
    async fn unavailable_before_initialize() {
        let provider = HttpAttestor::new("https://attestor.example.com", "app").unwrap();
        assert!(!provider.is_available());
        let err = provider
            .generate(DataType::Identity, Address::new([0xaa; 20]))
            .await
            .unwrap_err();
        assert!(matches!(err, AttestationError::Unavailable(_)));
    }
}
