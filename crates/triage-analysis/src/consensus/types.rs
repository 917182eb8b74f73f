//! Core types for consensus calculation and contradiction detection.

use std::fmt;

use serde::{Deserialize, Serialize};
use triage_core::{FxHashMap, ResolutionLabel, Severity};

/// How much historical signal a template has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusStatus {
    /// No non-empty historical resolutions at all.
    NoData,
    /// Some history, but below the minimum sample size.
    InsufficientData,
    /// Enough history to trust the majority.
    Consensus,
}

impl ConsensusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoData => "no_data",
            Self::InsufficientData => "insufficient_data",
            Self::Consensus => "consensus",
        }
    }
}

impl fmt::Display for ConsensusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How decisive an established consensus is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusStrength {
    /// Majority ratio at or above the strong threshold AND a Wilson lower
    /// bound of at least 0.70.
    Strong,
    /// Majority ratio at or above 0.80.
    Moderate,
    /// Everything else.
    Weak,
}

impl fmt::Display for ConsensusStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Moderate => write!(f, "moderate"),
            Self::Weak => write!(f, "weak"),
        }
    }
}

/// The learned consensus summary for one template hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub status: ConsensusStatus,
    /// Most common resolution, when any data exists.
    pub majority_resolution: Option<ResolutionLabel>,
    /// `majority_count / sample_size`, when any data exists.
    pub ratio: Option<f64>,
    /// Count of non-empty resolutions consumed.
    pub sample_size: usize,
    /// Only set when `status == Consensus`.
    pub strength: Option<ConsensusStrength>,
    /// Wilson 95% interval for the majority proportion; only computed at
    /// full consensus. Both bounds lie in [0, 1].
    pub confidence_interval: Option<(f64, f64)>,
    /// Full label → count distribution; only reported at full consensus.
    pub distribution: Option<FxHashMap<ResolutionLabel, usize>>,
}

impl ConsensusResult {
    /// The result for a template with no history at all.
    pub fn no_data() -> Self {
        Self {
            status: ConsensusStatus::NoData,
            majority_resolution: None,
            ratio: None,
            sample_size: 0,
            strength: None,
            confidence_interval: None,
            distribution: None,
        }
    }
}

/// The outcome of comparing a new resolution against consensus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContradictionVerdict {
    pub is_contradiction: bool,
    /// Absent when the resolution simply matches consensus.
    pub severity: Option<Severity>,
    /// Stable machine-readable explanation, e.g. `matches_consensus`.
    pub reason: String,
    pub new_resolution: Option<ResolutionLabel>,
    pub historical_resolution: Option<ResolutionLabel>,
    pub consensus_strength: Option<ConsensusStrength>,
    pub sample_size: usize,
    pub historical_ratio: Option<f64>,
}
