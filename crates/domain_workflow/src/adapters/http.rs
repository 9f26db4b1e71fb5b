//! HTTP adapters
//!
//! Both adapters talk JSON to a remote service.
//!
//! | Call | Request | Response |
//! |---|---|---|
//! | capability | `POST {base}/capabilities/{id}` with claim, evidence, prior log, instructions | `{"artifact": "..."}` |
//! | evidence | `GET {base}/claims/{claim_id}/evidence` | `{"medical": "...", "billing": "...", ...}` |
//!
//! # Error Handling
//!
//! - Timeouts -> `CapabilityError::Timeout` / `PortError::Timeout`
//! - 404 on evidence -> `PortError::NotFound`
//! - Connection failures and 5xx -> unavailable
//! - Undecodable bodies -> `CapabilityError::Unavailable` / `PortError::Transformation`

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use core_kernel::{CapabilityId, DomainPort, PortError, StageId};
use domain_claims::{CapabilityResult, ClaimRecord, EvidenceBundle};

use crate::capability::{CapabilityError, CapabilityInvoker, CapabilityRequest};

/// Where a remote service lives and how to reach it
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServiceConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Client-wide timeout; capability calls also carry their own
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    300
}

impl HttpServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    fn client(&self) -> Result<Client, PortError> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| PortError::connection(format!("failed to create HTTP client: {}", e)))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[derive(Serialize)]
struct InvokeBody<'a> {
    capability_id: &'a CapabilityId,
    stage_id: &'a StageId,
    instructions: Option<&'a str>,
    claim: &'a ClaimRecord,
    evidence: &'a EvidenceBundle,
    prior_log: &'a [CapabilityResult],
}

#[derive(Deserialize)]
struct InvokeResponse {
    artifact: String,
}

/// Invokes capabilities hosted by a remote analysis service
#[derive(Debug, Clone)]
pub struct HttpCapabilityInvoker {
    config: HttpServiceConfig,
    client: Client,
}

impl HttpCapabilityInvoker {
    pub fn new(config: HttpServiceConfig) -> Result<Self, PortError> {
        let client = config.client()?;
        Ok(Self { config, client })
    }
}

impl DomainPort for HttpCapabilityInvoker {}

#[async_trait]
impl CapabilityInvoker for HttpCapabilityInvoker {
    async fn invoke(&self, request: CapabilityRequest<'_>) -> Result<String, CapabilityError> {
        let capability_id = request.capability_id;
        let url = self.config.url(&format!("capabilities/{}", capability_id));
        let body = InvokeBody {
            capability_id,
            stage_id: request.stage_id,
            instructions: request.instructions,
            claim: request.claim,
            evidence: request.evidence,
            prior_log: request.prior_log,
        };

        tracing::debug!(
            capability_id = %capability_id,
            prior_entries = request.prior_log.len(),
            "Invoking remote capability"
        );

        let start = Instant::now();
        let response = self
            .config
            .authorize(self.client.post(&url))
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CapabilityError::timeout(capability_id, request.timeout)
                } else {
                    CapabilityError::unavailable(capability_id, e.to_string())
                }
            })?;

        tracing::info!(
            capability_id = %capability_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            status = %response.status(),
            "Remote capability responded"
        );

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CapabilityError::unavailable(
                capability_id,
                format!("service returned {}: {}", status, error_text),
            ));
        }

        let parsed: InvokeResponse = response
            .json()
            .await
            .map_err(|e| CapabilityError::unavailable(capability_id, format!("invalid response body: {}", e)))?;
        Ok(parsed.artifact)
    }
}

/// Fetches evidence bundles from the document analysis service
#[derive(Debug, Clone)]
pub struct HttpEvidenceCollector {
    config: HttpServiceConfig,
    client: Client,
}

impl HttpEvidenceCollector {
    pub fn new(config: HttpServiceConfig) -> Result<Self, PortError> {
        let client = config.client()?;
        Ok(Self { config, client })
    }
}

impl DomainPort for HttpEvidenceCollector {}

#[async_trait]
impl crate::ports::EvidenceCollector for HttpEvidenceCollector {
    async fn collect(&self, claim: &ClaimRecord) -> Result<EvidenceBundle, PortError> {
        let url = self.config.url(&format!("claims/{}/evidence", claim.id));
        let start = Instant::now();

        let response = self
            .config
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PortError::Timeout {
                        operation: "collect_evidence".to_string(),
                        duration_ms: start.elapsed().as_millis() as u64,
                    }
                } else {
                    PortError::Connection {
                        message: format!("evidence service unreachable: {}", e),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(PortError::not_found("EvidenceBundle", &claim.id)),
            status if status.is_server_error() => {
                return Err(PortError::ServiceUnavailable {
                    service: format!("evidence ({})", status),
                })
            }
            status if !status.is_success() => {
                return Err(PortError::internal(format!("evidence service returned {}", status)))
            }
            _ => {}
        }

        response
            .json::<EvidenceBundle>()
            .await
            .map_err(|e| PortError::transformation(format!("invalid evidence bundle: {}", e)))
    }
}
