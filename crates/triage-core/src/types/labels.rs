//! Resolution labels and drift severities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An analyst's closing resolution for an alert.
///
/// The vocabulary is fixed: three values plus "absent", which callers
/// model as `Option<ResolutionLabel>::None`. An absent resolution is never
/// a data point for consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionLabel {
    TruePositive,
    FalsePositive,
    Ignored,
}

impl ResolutionLabel {
    /// Parse a raw resolution string. Unknown or empty strings yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "true_positive" => Some(Self::TruePositive),
            "false_positive" => Some(Self::FalsePositive),
            "ignored" => Some(Self::Ignored),
            _ => None,
        }
    }

    /// The canonical wire name for this label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TruePositive => "true_positive",
            Self::FalsePositive => "false_positive",
            Self::Ignored => "ignored",
        }
    }
}

impl fmt::Display for ResolutionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a resolution-drift finding.
///
/// Ordered from most to least urgent. `Info` marks non-contradictions that
/// are still worth surfacing (novel patterns, sparse history).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
