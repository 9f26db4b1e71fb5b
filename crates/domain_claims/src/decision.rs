//! Adjudication decision model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::Money;

/// Final decision on a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approved,
    Rejected,
    /// No firm decision could be reached; a human must review
    Pending,
}

impl DecisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionOutcome::Approved => "APPROVED",
            DecisionOutcome::Rejected => "REJECTED",
            DecisionOutcome::Pending => "PENDING",
        }
    }
}

impl fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fraud risk assessed for the claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy balance after the approved amount is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    Sufficient,
    /// Less than a tenth of the coverage limit remains
    Low,
    /// Utilization is above the coverage limit
    OverLimit,
}

impl BalanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceStatus::Sufficient => "SUFFICIENT",
            BalanceStatus::Low => "LOW",
            BalanceStatus::OverLimit => "OVER_LIMIT",
        }
    }
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the decision fields came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionSource {
    /// Every field was found in capability output
    #[serde(rename = "agent-derived")]
    AgentDerived,
    /// At least one field fell back to its safe default
    #[serde(rename = "fallback-default")]
    FallbackDefault,
}

/// Decision fields the extractor resolves independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionField {
    Decision,
    ApprovedAmount,
    FraudRiskLevel,
    BalanceStatus,
    Rationale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    /// Reported by a capability in its analysis text
    CapabilityFinding,
    /// The requested amount is larger than the remaining policy balance
    BalanceExceeded,
    /// No decision could be read from any capability output
    IncompleteAnalysis,
}

/// A fraud or risk signal attached to the decision
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FraudIndicator {
    pub category: IndicatorCategory,
    pub severity: Severity,
    pub description: String,
}

impl FraudIndicator {
    pub fn new(category: IndicatorCategory, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            description: description.into(),
        }
    }
}

impl fmt::Display for FraudIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.as_str(), self.description)
    }
}

/// Structured decision for a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub decision: DecisionOutcome,
    pub approved_amount: Money,
    pub fraud_risk_level: RiskLevel,
    pub balance_status: BalanceStatus,
    pub remaining_balance: Money,
    /// Share of the coverage limit used once this claim is paid, two decimals
    pub policy_utilization_percent: Decimal,
    pub fraud_indicators: Vec<FraudIndicator>,
    pub rationale: String,
    pub decision_source: DecisionSource,
    /// Fields that could not be found and took their default value
    pub defaulted_fields: Vec<DecisionField>,
}

impl Decision {
    pub fn has_indicator(&self, category: IndicatorCategory) -> bool {
        self.fraud_indicators.iter().any(|i| i.category == category)
    }

    /// Adds an indicator unless an identical one is already present
    pub fn push_indicator(&mut self, indicator: FraudIndicator) {
        if !self.fraud_indicators.contains(&indicator) {
            self.fraud_indicators.push(indicator);
        }
    }

    pub fn summary(&self) -> DecisionSummary {
        DecisionSummary {
            decision: self.decision,
            approved_amount: self.approved_amount,
            fraud_risk_level: self.fraud_risk_level,
            balance_status: self.balance_status,
            decision_source: self.decision_source,
        }
    }
}

/// The headline fields of a decision, sent to stream subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub decision: DecisionOutcome,
    pub approved_amount: Money,
    pub fraud_risk_level: RiskLevel,
    pub balance_status: BalanceStatus,
    pub decision_source: DecisionSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_source_wire_names() {
        assert_eq!(
            serde_json::to_string(&DecisionSource::AgentDerived).unwrap(),
            "\"agent-derived\""
        );
        assert_eq!(
            serde_json::to_string(&DecisionSource::FallbackDefault).unwrap(),
            "\"fallback-default\""
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Medium > Severity::Low);
    }
}
