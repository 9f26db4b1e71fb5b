//! Stage plans
//!
//! A plan is an ordered list of stages. A sequential stage runs exactly one
//! capability; a parallel group runs its members concurrently. Plans are
//! static configuration and are validated once, when built.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use core_kernel::{CapabilityId, StageId};
use crate::error::WorkflowError;

/// Capability ids used by the standard plan
pub mod capabilities {
    pub const FRAUD_DETECTION: &str = "fraud_detection_specialist";
    pub const MEDICAL_VALIDATOR: &str = "medical_validator";
    pub const BILLING_VALIDATOR: &str = "billing_validator";
    pub const POLICY_BALANCE_VALIDATOR: &str = "policy_balance_validator";
    pub const COVERAGE_EXCLUSIONS_VALIDATOR: &str = "coverage_exclusions_validator";
    pub const POLICY_ADJUSTMENT_COORDINATOR: &str = "policy_adjustment_coordinator";
    pub const DECISION_COORDINATOR: &str = "decision_coordinator";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    Sequential,
    ParallelGroup,
}

/// One stage of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub id: StageId,
    pub mode: ExecutionMode,
    pub capabilities: Vec<CapabilityId>,
    #[serde(default)]
    pub description: String,
}

impl StageDefinition {
    pub fn sequential(id: StageId, capability: CapabilityId, description: impl Into<String>) -> Self {
        Self {
            id,
            mode: ExecutionMode::Sequential,
            capabilities: vec![capability],
            description: description.into(),
        }
    }

    pub fn parallel(id: StageId, capabilities: Vec<CapabilityId>, description: impl Into<String>) -> Self {
        Self {
            id,
            mode: ExecutionMode::ParallelGroup,
            capabilities,
            description: description.into(),
        }
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        match self.mode {
            ExecutionMode::Sequential if self.capabilities.len() != 1 => Err(WorkflowError::invalid_plan(
                format!("sequential stage '{}' must have exactly one capability", self.id),
            )),
            ExecutionMode::ParallelGroup if self.capabilities.is_empty() => Err(WorkflowError::invalid_plan(
                format!("parallel stage '{}' has no capabilities", self.id),
            )),
            _ => Ok(()),
        }
    }
}

/// Ordered, validated list of stages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StagePlan {
    stages: Vec<StageDefinition>,
}

impl StagePlan {
    /// Builds a plan, rejecting duplicate stage ids and malformed stages
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, WorkflowError> {
        let mut seen = BTreeSet::new();
        for stage in &stages {
            if !seen.insert(stage.id.clone()) {
                return Err(WorkflowError::invalid_plan(format!("duplicate stage id '{}'", stage.id)));
            }
            stage.validate()?;
        }
        Ok(Self { stages })
    }

    /// A plan with no stages
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fraud screening, specialist and policy reviews, adjustment, then the final decision
    pub fn standard() -> Result<Self, WorkflowError> {
        use capabilities::*;

        let stage = |id: &str| StageId::new(id).map_err(|e| WorkflowError::invalid_plan(e.to_string()));
        let cap = |id: &str| CapabilityId::new(id).map_err(|e| WorkflowError::invalid_plan(e.to_string()));

        Self::new(vec![
            StageDefinition::sequential(
                stage("fraud_screening")?,
                cap(FRAUD_DETECTION)?,
                "Cross-document consistency and fraud screening",
            ),
            StageDefinition::parallel(
                stage("specialist_review")?,
                vec![cap(MEDICAL_VALIDATOR)?, cap(BILLING_VALIDATOR)?],
                "Medical necessity and billing accuracy review",
            ),
            StageDefinition::parallel(
                stage("policy_review")?,
                vec![cap(POLICY_BALANCE_VALIDATOR)?, cap(COVERAGE_EXCLUSIONS_VALIDATOR)?],
                "Policy balance and coverage exclusion checks",
            ),
            StageDefinition::sequential(
                stage("adjustment")?,
                cap(POLICY_ADJUSTMENT_COORDINATOR)?,
                "Adjust the payable amount to policy terms",
            ),
            StageDefinition::sequential(
                stage("decision")?,
                cap(DECISION_COORDINATOR)?,
                "Final decision",
            ),
        ])
    }

    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Every capability in the plan, in declared order
    pub fn capability_ids(&self) -> impl Iterator<Item = &CapabilityId> {
        self.stages.iter().flat_map(|stage| stage.capabilities.iter())
    }

    pub fn capability_count(&self) -> usize {
        self.stages.iter().map(|stage| stage.capabilities.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl<'de> Deserialize<'de> for StagePlan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let stages = Vec::<StageDefinition>::deserialize(deserializer)?;
        StagePlan::new(stages).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_plan_shape() {
        let plan = StagePlan::standard().unwrap();
        assert_eq!(plan.stages().len(), 5);
        assert_eq!(plan.capability_count(), 7);
        assert_eq!(
            plan.capability_ids().last().map(CapabilityId::as_str),
            Some(capabilities::DECISION_COORDINATOR)
        );
    }

    #[test]
    fn test_duplicate_stage_ids_rejected() {
        let id = StageId::new("review").unwrap();
        let cap = CapabilityId::new("medical_validator").unwrap();
        let result = StagePlan::new(vec![
            StageDefinition::sequential(id.clone(), cap.clone(), ""),
            StageDefinition::sequential(id, cap, ""),
        ]);
        assert!(matches!(result, Err(WorkflowError::InvalidPlan(_))));
    }

    #[test]
    fn test_sequential_stage_needs_one_capability() {
        let stage = StageDefinition {
            id: StageId::new("review").unwrap(),
            mode: ExecutionMode::Sequential,
            capabilities: vec![
                CapabilityId::new("a").unwrap(),
                CapabilityId::new("b").unwrap(),
            ],
            description: String::new(),
        };
        assert!(StagePlan::new(vec![stage]).is_err());
    }

    #[test]
    fn test_plan_deserialization_validates() {
        let json = r#"[{"id": "review", "mode": "parallel-group", "capabilities": []}]"#;
        assert!(serde_json::from_str::<StagePlan>(json).is_err());

        let json = r#"[{"id": "review", "mode": "parallel-group", "capabilities": ["a", "b"]}]"#;
        let plan: StagePlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.capability_count(), 2);
    }
}
