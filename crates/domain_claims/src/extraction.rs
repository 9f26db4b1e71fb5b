//! Decision extraction from free-form analysis text
//!
//! Capabilities answer in prose. The extractor turns the conversation log of
//! a run into a structured [`Decision`] without ever failing:
//!
//! 1. The last log entry is the coordinator's verdict and is read first.
//! 2. Each field that the coordinator leaves unresolved is looked up in the
//!    earlier entries, most recent first.
//! 3. Whatever is still unresolved takes a safe default (`Pending`, `Medium`
//!    risk, zero amount, `Sufficient` balance) and the decision is marked
//!    `fallback-default`.
//!
//! Every field is found with an ordered list of label rules. A rule only
//! matches when the label is followed by a separator (`:`, `=` or `-`,
//! optionally wrapped in markdown emphasis), so prose such as "a decision was
//! approved by the panel" is never mistaken for a verdict.
//!
//! The extractor is pure: the same log and claim always yield the same
//! decision.

use std::collections::HashSet;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use core_kernel::Money;
use crate::claim::ClaimRecord;
use crate::conversation::{CapabilityResult, ConversationLog};
use crate::decision::{
    BalanceStatus, Decision, DecisionField, DecisionOutcome, DecisionSource, FraudIndicator,
    IndicatorCategory, RiskLevel, Severity,
};

/// Rationale used when no capability explains its verdict
pub const DEFAULT_RATIONALE: &str = "insufficient structured output";

// Label, optional emphasis, mandatory separator, optional emphasis
const SEPARATOR: &str = r"[ \t]*[*_]*[ \t]*[:=\-][ \t]*[*_]*[ \t]*";

// Amount labels may be followed directly by the figure
const OPTIONAL_SEPARATOR: &str = r"[ \t]*[*_]*[ \t]*[:=\-]?[ \t]*[*_]*[ \t]*";

fn label_rule(label: &str, separator: &str, value: &str) -> Regex {
    let pattern = format!(r"(?i)\b(?:{}){}(?:{})", label, separator, value);
    Regex::new(&pattern).expect("Invalid label pattern")
}

static DECISION_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let value = r"(approved?|reject(?:ed)?|denied|declined|pending)\b";
    vec![
        label_rule(r"final[\s_]+decision", SEPARATOR, value),
        label_rule(r"decision", SEPARATOR, value),
        label_rule(r"(?:claim|final)[\s_]+status", SEPARATOR, value),
    ]
});

static AMOUNT_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let value = r"(?:₹|rs\.?|inr|\$|usd|€|eur|£|gbp)?\s*([0-9][0-9,]*(?:\.[0-9]+)?)";
    let unit = r"(?:\s*\([^)\n]{1,8}\))?";
    vec![
        label_rule(&format!(r"final[\s_]+approved[\s_]+amount{}", unit), OPTIONAL_SEPARATOR, value),
        label_rule(&format!(r"approved[\s_]+amount{}", unit), OPTIONAL_SEPARATOR, value),
        label_rule(&format!(r"amount[\s_]+approved{}", unit), OPTIONAL_SEPARATOR, value),
        label_rule(&format!(r"(?:recommended|settlement)[\s_]+amount{}", unit), OPTIONAL_SEPARATOR, value),
    ]
});

static RISK_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let value = r"(low|medium|moderate|high|critical)\b";
    vec![
        label_rule(r"fraud[\s_]+risk[\s_]+level", SEPARATOR, value),
        label_rule(r"fraud[\s_]+risk(?:[\s_]+assessment)?", SEPARATOR, value),
        label_rule(r"overall[\s_]+risk(?:[\s_]+level)?", SEPARATOR, value),
    ]
});

static BALANCE_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    let value = r"(sufficient|insufficient|low|exceeded|over[\s_\-]?limit)\b";
    vec![
        label_rule(r"policy[\s_]+balance[\s_]+status", SEPARATOR, value),
        label_rule(r"balance[\s_]+status", SEPARATOR, value),
    ]
});

static RATIONALE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\s#>*_\-]*(?:decision[\s_]+)?(?:rationale|justification|reasoning)\b[\s*_]*[:\-][\s*_]*(.*)$")
        .expect("Invalid rationale pattern")
});

static INDICATOR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\s>*\-•]*(?:fraud[\s_]+indicator|red[\s_]+flag|fraud[\s_]+flag)s?\b[\s*_]*[:\-][\s*_]*(.+)$")
        .expect("Invalid indicator pattern")
});

static SEVERITY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(critical|high|medium|low)\s*[:\-]\s*(.+)$").expect("Invalid severity pattern")
});

/// Reads a structured decision out of a run's conversation log
pub struct DecisionExtractor;

impl DecisionExtractor {
    /// Extracts the decision for `claim` from `log`
    ///
    /// Amounts are expressed in the claim's currency. The remaining balance
    /// and utilization are provisional until the decision is reconciled.
    pub fn extract(log: &ConversationLog, claim: &ClaimRecord) -> Decision {
        let sources = ordered_sources(log);
        let mut defaulted = Vec::new();

        let decision = resolve(&sources, DecisionField::Decision, find_decision)
            .unwrap_or_else(|| {
                defaulted.push(DecisionField::Decision);
                DecisionOutcome::Pending
            });

        let approved_amount = resolve(&sources, DecisionField::ApprovedAmount, find_amount)
            .unwrap_or_else(|| {
                defaulted.push(DecisionField::ApprovedAmount);
                Decimal::ZERO
            });

        let fraud_risk_level = resolve(&sources, DecisionField::FraudRiskLevel, find_risk)
            .unwrap_or_else(|| {
                defaulted.push(DecisionField::FraudRiskLevel);
                RiskLevel::Medium
            });

        let balance_status = resolve(&sources, DecisionField::BalanceStatus, find_balance_status)
            .unwrap_or_else(|| {
                defaulted.push(DecisionField::BalanceStatus);
                BalanceStatus::Sufficient
            });

        let rationale = resolve(&sources, DecisionField::Rationale, find_rationale)
            .unwrap_or_else(|| {
                defaulted.push(DecisionField::Rationale);
                DEFAULT_RATIONALE.to_string()
            });

        let mut fraud_indicators = collect_indicators(log);
        if defaulted.contains(&DecisionField::Decision) {
            let indicator = FraudIndicator::new(
                IndicatorCategory::IncompleteAnalysis,
                Severity::Medium,
                "No capability reported a final decision",
            );
            if !fraud_indicators.contains(&indicator) {
                fraud_indicators.push(indicator);
            }
        }

        let decision_source = if defaulted.is_empty() {
            DecisionSource::AgentDerived
        } else {
            warn!(
                claim_id = %claim.id,
                defaulted = ?defaulted,
                "Decision fields fell back to defaults"
            );
            DecisionSource::FallbackDefault
        };

        Decision {
            decision,
            approved_amount: Money::new(approved_amount, claim.currency()),
            fraud_risk_level,
            balance_status,
            remaining_balance: claim.available_balance,
            policy_utilization_percent: Decimal::ZERO,
            fraud_indicators,
            rationale,
            decision_source,
            defaulted_fields: defaulted,
        }
    }
}

/// Coordinator first, then earlier entries most recent first
fn ordered_sources(log: &ConversationLog) -> Vec<&CapabilityResult> {
    log.all().iter().rev().collect()
}

fn resolve<T>(
    sources: &[&CapabilityResult],
    field: DecisionField,
    find: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    sources.iter().enumerate().find_map(|(depth, result)| {
        let value = find(&result.artifact)?;
        debug!(
            field = ?field,
            capability = %result.capability_id,
            from_coordinator = depth == 0,
            "Resolved decision field"
        );
        Some(value)
    })
}

fn first_capture<'t>(rules: &[Regex], text: &'t str) -> Option<&'t str> {
    rules
        .iter()
        .find_map(|rule| rule.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str()))
}

fn find_decision(text: &str) -> Option<DecisionOutcome> {
    let word = first_capture(&DECISION_RULES, text)?.to_ascii_lowercase();
    match word.as_str() {
        "approve" | "approved" => Some(DecisionOutcome::Approved),
        "reject" | "rejected" | "denied" | "declined" => Some(DecisionOutcome::Rejected),
        "pending" => Some(DecisionOutcome::Pending),
        _ => None,
    }
}

fn find_amount(text: &str) -> Option<Decimal> {
    AMOUNT_RULES.iter().find_map(|rule| {
        rule.captures_iter(text).find_map(|captures| {
            let digits = captures.get(1)?.as_str().replace(',', "");
            Decimal::from_str(&digits).ok()
        })
    })
}

fn find_risk(text: &str) -> Option<RiskLevel> {
    let word = first_capture(&RISK_RULES, text)?.to_ascii_lowercase();
    match word.as_str() {
        "low" => Some(RiskLevel::Low),
        "medium" | "moderate" => Some(RiskLevel::Medium),
        "high" | "critical" => Some(RiskLevel::High),
        _ => None,
    }
}

fn find_balance_status(text: &str) -> Option<BalanceStatus> {
    let word = first_capture(&BALANCE_RULES, text)?.to_ascii_lowercase();
    match word.as_str() {
        "sufficient" => Some(BalanceStatus::Sufficient),
        "insufficient" | "low" => Some(BalanceStatus::Low),
        _ if word == "exceeded" || word.starts_with("over") => Some(BalanceStatus::OverLimit),
        _ => None,
    }
}

/// The rationale block runs from its label to the next blank line or heading
fn find_rationale(text: &str) -> Option<String> {
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let Some(captures) = RATIONALE_LINE.captures(line) else {
            continue;
        };

        let mut block = Vec::new();
        let first = trim_markup(captures.get(1).map_or("", |m| m.as_str()));
        if !first.is_empty() {
            block.push(first.to_string());
        }
        for next in lines.by_ref() {
            let trimmed = next.trim();
            if trimmed.is_empty() {
                if block.is_empty() {
                    continue;
                }
                break;
            }
            if trimmed.starts_with('#') {
                break;
            }
            block.push(trimmed.to_string());
        }

        let rationale = block.join("\n");
        return (!rationale.trim().is_empty()).then_some(rationale);
    }
    None
}

fn trim_markup(text: &str) -> &str {
    text.trim().trim_matches(|c| c == '*' || c == '_').trim()
}

fn collect_indicators(log: &ConversationLog) -> Vec<FraudIndicator> {
    let mut seen = HashSet::new();
    let mut indicators = Vec::new();

    for result in log.all().iter().filter(|r| r.is_completed()) {
        for line in result.artifact.lines() {
            let Some(captures) = INDICATOR_LINE.captures(line) else {
                continue;
            };
            let raw = trim_markup(captures.get(1).map_or("", |m| m.as_str()));
            if raw.is_empty() || is_placeholder(raw) {
                continue;
            }

            let (severity, description) = match SEVERITY_PREFIX.captures(raw) {
                Some(prefixed) => {
                    let severity = match prefixed[1].to_ascii_lowercase().as_str() {
                        "critical" => Severity::Critical,
                        "high" => Severity::High,
                        "low" => Severity::Low,
                        _ => Severity::Medium,
                    };
                    (severity, prefixed[2].trim().to_string())
                }
                None => (Severity::Medium, raw.to_string()),
            };

            if seen.insert((severity, description.to_lowercase())) {
                indicators.push(FraudIndicator::new(
                    IndicatorCategory::CapabilityFinding,
                    severity,
                    description,
                ));
            }
        }
    }
    indicators
}

fn is_placeholder(text: &str) -> bool {
    matches!(
        text.to_ascii_lowercase().trim_end_matches('.'),
        "none" | "n/a" | "nil" | "none identified" | "none detected" | "none found"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decision_requires_separator() {
        assert_eq!(find_decision("**FINAL DECISION:** APPROVED"), Some(DecisionOutcome::Approved));
        assert_eq!(find_decision("Decision - denied"), Some(DecisionOutcome::Rejected));
        assert_eq!(find_decision("The decision was approved by the panel"), None);
    }

    #[test]
    fn test_final_decision_rule_wins_over_generic() {
        let text = "Interim decision: PENDING\nFINAL DECISION: REJECTED";
        assert_eq!(find_decision(text), Some(DecisionOutcome::Rejected));
    }

    #[test]
    fn test_heading_without_separator_is_skipped() {
        let text = "### FINAL DECISION\n**FINAL DECISION:** PENDING";
        assert_eq!(find_decision(text), Some(DecisionOutcome::Pending));
    }

    #[test]
    fn test_amount_formats() {
        assert_eq!(find_amount("Approved Amount: ₹72500"), Some(dec!(72500)));
        assert_eq!(find_amount("**FINAL APPROVED AMOUNT:** ₹3,96,591"), Some(dec!(396591)));
        assert_eq!(find_amount("Approved amount (INR): Rs. 1,200.50"), Some(dec!(1200.50)));
        assert_eq!(find_amount("Approved Amount: to be confirmed"), None);
    }

    #[test]
    fn test_risk_and_balance_synonyms() {
        assert_eq!(find_risk("**FRAUD_RISK:** LOW"), Some(RiskLevel::Low));
        assert_eq!(find_risk("Fraud Risk Level: moderate"), Some(RiskLevel::Medium));
        assert_eq!(find_risk("Coverage risk level: HIGH"), None);
        assert_eq!(find_balance_status("POLICY BALANCE STATUS: INSUFFICIENT"), Some(BalanceStatus::Low));
        assert_eq!(find_balance_status("Balance status: over limit"), Some(BalanceStatus::OverLimit));
        assert_eq!(find_balance_status("Balance Status: EXCEEDED"), Some(BalanceStatus::OverLimit));
    }

    #[test]
    fn test_rationale_block() {
        let text = "**Rationale:**\n1. Identity verified\n2. Treatment matches diagnosis\n\n**Balance After Claim:** ₹0";
        assert_eq!(
            find_rationale(text),
            Some("1. Identity verified\n2. Treatment matches diagnosis".to_string())
        );
        assert_eq!(find_rationale("Justification: documents consistent"), Some("documents consistent".to_string()));
        assert_eq!(find_rationale("no label here"), None);
    }

    #[test]
    fn test_placeholder_indicators_ignored() {
        assert!(is_placeholder("None"));
        assert!(is_placeholder("none identified."));
        assert!(!is_placeholder("duplicate invoice"));
    }
}
