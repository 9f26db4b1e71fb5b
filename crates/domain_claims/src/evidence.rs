//! Evidence bundle
//!
//! Evidence is collected once per run and handed to every capability as an
//! owned snapshot. Each kind appears at most once; its value is the analysis
//! text produced by the upstream document pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClaimError;

/// Kind of evidence attached to a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Medical,
    Billing,
    Imaging,
    Policy,
    Lab,
}

impl EvidenceKind {
    /// Kinds every run needs before any capability is invoked
    pub const REQUIRED: [EvidenceKind; 3] =
        [EvidenceKind::Medical, EvidenceKind::Billing, EvidenceKind::Policy];

    pub const ALL: [EvidenceKind; 5] = [
        EvidenceKind::Medical,
        EvidenceKind::Billing,
        EvidenceKind::Imaging,
        EvidenceKind::Policy,
        EvidenceKind::Lab,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceKind::Medical => "medical",
            EvidenceKind::Billing => "billing",
            EvidenceKind::Imaging => "imaging",
            EvidenceKind::Policy => "policy",
            EvidenceKind::Lab => "lab",
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvidenceKind {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medical" => Ok(EvidenceKind::Medical),
            "billing" => Ok(EvidenceKind::Billing),
            "imaging" => Ok(EvidenceKind::Imaging),
            "policy" => Ok(EvidenceKind::Policy),
            "lab" => Ok(EvidenceKind::Lab),
            other => Err(ClaimError::invalid_evidence(format!("unknown evidence kind '{}'", other))),
        }
    }
}

/// Evidence kind to analysis text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceBundle {
    entries: BTreeMap<EvidenceKind, String>,
}

impl EvidenceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds evidence of a kind, replacing any earlier text for that kind
    pub fn with(mut self, kind: EvidenceKind, text: impl Into<String>) -> Self {
        self.insert(kind, text);
        self
    }

    pub fn insert(&mut self, kind: EvidenceKind, text: impl Into<String>) {
        self.entries.insert(kind, text.into());
    }

    pub fn get(&self, kind: EvidenceKind) -> Option<&str> {
        self.entries.get(&kind).map(String::as_str)
    }

    pub fn contains(&self, kind: EvidenceKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Kinds present, in a stable order
    pub fn kinds(&self) -> Vec<EvidenceKind> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EvidenceKind, &str)> {
        self.entries.iter().map(|(kind, text)| (*kind, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Required kinds absent from this bundle
    pub fn missing_required(&self) -> Vec<EvidenceKind> {
        EvidenceKind::REQUIRED
            .iter()
            .copied()
            .filter(|kind| !self.contains(*kind))
            .collect()
    }

    /// Fails when a required kind is missing
    pub fn validate(&self) -> Result<(), ClaimError> {
        let missing = self.missing_required();
        if missing.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = missing.iter().map(EvidenceKind::as_str).collect();
        Err(ClaimError::invalid_evidence(format!(
            "missing required evidence: {}",
            names.join(", ")
        )))
    }
}

impl FromIterator<(EvidenceKind, String)> for EvidenceBundle {
    fn from_iter<I: IntoIterator<Item = (EvidenceKind, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
