//! API configuration
//!
//! Loaded with the `config` crate from an optional `config/adjudicator`
//! file and `API_*` environment variables, nested with `__`:
//!
//! ```text
//! API_PORT=8080
//! API_JWT_SECRET=...
//! API_ORCHESTRATION__CAPABILITY_TIMEOUT_SECS=90
//! API_ORCHESTRATION__DATABASE_URL=postgres://localhost/claims
//! API_ORCHESTRATION__CAPABILITY_SERVICE__BASE_URL=http://analysis:9000
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use core_kernel::{CapabilityId, CoreError};
use domain_workflow::adapters::HttpServiceConfig;
use domain_workflow::{CapabilityInstructions, StagePlan, WorkflowError};

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Log level
    pub log_level: String,
    pub orchestration: OrchestrationConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            log_level: "info".to_string(),
            orchestration: OrchestrationConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the optional file and the environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config/adjudicator").required(false))
            .add_source(
                config::Environment::with_prefix("API")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How runs are executed and where their collaborators live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Upper bound on a single capability invocation
    pub capability_timeout_secs: u64,
    /// Replaces the standard five-stage plan
    pub stage_plan: Option<StagePlan>,
    /// Instruction text per capability id
    pub instructions: BTreeMap<String, String>,
    /// Remote service hosting the capabilities
    pub capability_service: Option<HttpServiceConfig>,
    /// Remote service supplying evidence bundles
    pub evidence_service: Option<HttpServiceConfig>,
    /// PostgreSQL store when set, in-memory otherwise
    pub database_url: Option<String>,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            capability_timeout_secs: 120,
            stage_plan: None,
            instructions: BTreeMap::new(),
            capability_service: None,
            evidence_service: None,
            database_url: None,
        }
    }
}

impl OrchestrationConfig {
    pub fn capability_timeout(&self) -> Duration {
        Duration::from_secs(self.capability_timeout_secs)
    }

    /// The configured plan, or the standard one
    pub fn plan(&self) -> Result<StagePlan, WorkflowError> {
        match &self.stage_plan {
            Some(plan) => Ok(plan.clone()),
            None => StagePlan::standard(),
        }
    }

    pub fn instructions(&self) -> Result<CapabilityInstructions, CoreError> {
        let entries = self
            .instructions
            .iter()
            .map(|(id, text)| Ok((CapabilityId::new(id.as_str())?, text.clone())))
            .collect::<Result<BTreeMap<_, _>, CoreError>>()?;
        Ok(CapabilityInstructions::new(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.orchestration.capability_timeout(), Duration::from_secs(120));
        assert_eq!(config.orchestration.plan().unwrap().capability_count(), 7);
        assert!(config.orchestration.database_url.is_none());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: ApiConfig = serde_json::from_value(serde_json::json!({
            "port": 9090,
            "orchestration": {
                "capability_timeout_secs": 30,
                "instructions": { "medical_validator": "Focus on treatment necessity" },
                "stage_plan": [
                    { "id": "only", "mode": "sequential", "capabilities": ["decision_coordinator"] }
                ]
            }
        }))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.jwt_expiration_secs, 3600);
        assert_eq!(config.orchestration.plan().unwrap().capability_count(), 1);

        let instructions = config.orchestration.instructions().unwrap();
        let medical = CapabilityId::new("medical_validator").unwrap();
        assert_eq!(instructions.get(&medical), Some("Focus on treatment necessity"));
    }

    #[test]
    fn test_invalid_plan_is_rejected() {
        let result: Result<ApiConfig, _> = serde_json::from_value(serde_json::json!({
            "orchestration": {
                "stage_plan": [
                    { "id": "empty", "mode": "parallel-group", "capabilities": [] }
                ]
            }
        }));
        assert!(result.is_err());
    }
}
