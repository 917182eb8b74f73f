//! Consensus calculation with Wilson score intervals.
//!
//! The Wilson interval is used instead of a normal approximation because
//! it stays well-behaved at extreme proportions (0% or 100%) and with
//! small samples; per-template sample sizes here can sit right at the
//! minimum. 9/10 agreement must not read as strongly as 900/1000.

use statrs::distribution::{ContinuousCDF, Normal};
use triage_core::{FxHashMap, QaConfig, ResolutionLabel, Severity};

use super::types::{ConsensusResult, ConsensusStatus, ConsensusStrength, ContradictionVerdict};

/// Wilson lower-bound floor required (together with the ratio threshold)
/// for a consensus to classify as strong.
const STRONG_CI_FLOOR: f64 = 0.70;

/// Ratio floor for moderate consensus.
const MODERATE_RATIO_FLOOR: f64 = 0.80;

/// Calculates historical consensus and detects contradictions.
///
/// Holds only constructor configuration; every method is a pure function
/// of its arguments and trivially safe to share across threads.
pub struct ConsensusEngine {
    min_sample_size: usize,
    strong_threshold: f64,
}

impl ConsensusEngine {
    pub fn new(min_sample_size: usize, strong_threshold: f64) -> Self {
        Self {
            min_sample_size,
            strong_threshold,
        }
    }

    pub fn from_config(config: &QaConfig) -> Self {
        Self::new(config.min_sample_size, config.strong_consensus_threshold)
    }

    /// Summarize a template's historical resolutions.
    ///
    /// Empty entries are filtered out first; `sample_size` is always the
    /// count of what remains. Below `min_sample_size` the majority and
    /// ratio are still reported (useful signal, not yet actionable) but
    /// strength and the confidence interval are withheld.
    pub fn calculate_consensus(
        &self,
        resolutions: &[Option<ResolutionLabel>],
    ) -> ConsensusResult {
        let valid: Vec<ResolutionLabel> = resolutions.iter().flatten().copied().collect();
        let n = valid.len();

        if n == 0 {
            return ConsensusResult::no_data();
        }

        let (majority, majority_count, distribution) = majority_by_frequency(&valid);
        let ratio = majority_count as f64 / n as f64;

        if n < self.min_sample_size {
            return ConsensusResult {
                status: ConsensusStatus::InsufficientData,
                majority_resolution: Some(majority),
                ratio: Some(ratio),
                sample_size: n,
                strength: None,
                confidence_interval: None,
                distribution: None,
            };
        }

        let (ci_low, ci_high) = Self::wilson_interval(majority_count, n, 0.95);

        let strength = if ratio >= self.strong_threshold && ci_low >= STRONG_CI_FLOOR {
            ConsensusStrength::Strong
        } else if ratio >= MODERATE_RATIO_FLOOR {
            ConsensusStrength::Moderate
        } else {
            ConsensusStrength::Weak
        };

        ConsensusResult {
            status: ConsensusStatus::Consensus,
            majority_resolution: Some(majority),
            ratio: Some(ratio),
            sample_size: n,
            strength: Some(strength),
            confidence_interval: Some((ci_low, ci_high)),
            distribution: Some(distribution),
        }
    }

    /// Wilson score confidence interval for a binomial proportion.
    ///
    /// Two-sided z for the given confidence level; both bounds clamped to
    /// [0, 1]. `n == 0` returns `(0.0, 0.0)`.
    pub fn wilson_interval(successes: usize, n: usize, confidence: f64) -> (f64, f64) {
        if n == 0 {
            return (0.0, 0.0);
        }

        let z = Normal::standard().inverse_cdf(1.0 - (1.0 - confidence) / 2.0);
        let n = n as f64;
        let p = successes as f64 / n;

        let denominator = 1.0 + z * z / n;
        let center = (p + z * z / (2.0 * n)) / denominator;
        let spread = z * (p * (1.0 - p) / n + z * z / (4.0 * n * n)).sqrt() / denominator;

        ((center - spread).max(0.0), (center + spread).min(1.0))
    }

    /// Compare a new resolution against established consensus.
    ///
    /// Severity for real contradictions follows a fixed decision table on
    /// (historical majority, new resolution); strong and moderate
    /// consensus use the same table, weak consensus always yields LOW.
    pub fn detect_contradiction(
        &self,
        new_resolution: Option<ResolutionLabel>,
        consensus: &ConsensusResult,
    ) -> ContradictionVerdict {
        match consensus.status {
            ConsensusStatus::NoData => {
                return self.info_verdict(new_resolution, consensus, "novel_pattern");
            }
            ConsensusStatus::InsufficientData => {
                return self.info_verdict(new_resolution, consensus, "insufficient_historical_data");
            }
            ConsensusStatus::Consensus => {}
        }

        // A consensus result without a majority carries no information.
        let Some(historical) = consensus.majority_resolution else {
            return self.info_verdict(new_resolution, consensus, "novel_pattern");
        };

        if new_resolution == Some(historical) {
            return ContradictionVerdict {
                is_contradiction: false,
                severity: None,
                reason: "matches_consensus".to_string(),
                new_resolution,
                historical_resolution: Some(historical),
                consensus_strength: consensus.strength,
                sample_size: consensus.sample_size,
                historical_ratio: consensus.ratio,
            };
        }

        let strength = consensus.strength.unwrap_or(ConsensusStrength::Weak);
        let (severity, reason) = contradiction_severity(historical, new_resolution, strength);

        ContradictionVerdict {
            is_contradiction: true,
            severity: Some(severity),
            reason: reason.to_string(),
            new_resolution,
            historical_resolution: Some(historical),
            consensus_strength: consensus.strength,
            sample_size: consensus.sample_size,
            historical_ratio: consensus.ratio,
        }
    }

    fn info_verdict(
        &self,
        new_resolution: Option<ResolutionLabel>,
        consensus: &ConsensusResult,
        reason: &str,
    ) -> ContradictionVerdict {
        ContradictionVerdict {
            is_contradiction: false,
            severity: Some(Severity::Info),
            reason: reason.to_string(),
            new_resolution,
            historical_resolution: consensus.majority_resolution,
            consensus_strength: consensus.strength,
            sample_size: consensus.sample_size,
            historical_ratio: consensus.ratio,
        }
    }
}

/// Majority label, its count, and the full distribution.
///
/// Ties break toward the label encountered first in the input, so the
/// outcome is deterministic for a given input sequence.
fn majority_by_frequency(
    valid: &[ResolutionLabel],
) -> (ResolutionLabel, usize, FxHashMap<ResolutionLabel, usize>) {
    let mut counts: FxHashMap<ResolutionLabel, usize> = FxHashMap::default();
    let mut first_seen: Vec<ResolutionLabel> = Vec::with_capacity(3);

    for &label in valid {
        if !first_seen.contains(&label) {
            first_seen.push(label);
        }
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut majority = first_seen[0];
    let mut majority_count = counts[&majority];
    for &label in &first_seen[1..] {
        let count = counts[&label];
        if count > majority_count {
            majority = label;
            majority_count = count;
        }
    }

    (majority, majority_count, counts)
}

/// The severity decision table for confirmed contradictions.
fn contradiction_severity(
    historical: ResolutionLabel,
    new_resolution: Option<ResolutionLabel>,
    strength: ConsensusStrength,
) -> (Severity, &'static str) {
    use ResolutionLabel::{FalsePositive, Ignored, TruePositive};

    if strength == ConsensusStrength::Weak {
        return (Severity::Low, "contradicts_weak_consensus");
    }

    match (historical, new_resolution) {
        (TruePositive, Some(FalsePositive)) => {
            (Severity::Critical, "fp_contradicts_strong_tp_consensus")
        }
        (FalsePositive, Some(TruePositive)) => {
            (Severity::High, "tp_contradicts_strong_fp_consensus")
        }
        (TruePositive, Some(Ignored)) => {
            (Severity::Medium, "ignored_contradicts_strong_tp_consensus")
        }
        (Ignored, Some(TruePositive)) => (Severity::Low, "tp_contradicts_ignored_consensus"),
        _ => (Severity::Low, "other_contradiction"),
    }
}
