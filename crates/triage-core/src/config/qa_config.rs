//! Drift-detection settings.

use serde::{Deserialize, Serialize};

/// Configuration for a drift-analysis run.
///
/// Each engine instance is parameterized explicitly from one of these;
/// there is no module-level global state. Fetch-window fields
/// (`lookback_days`, `batch_hours`) are consumed by the alert-fetching
/// layer; the analysis core only reads the thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    /// How far back the historical baseline reaches, in days.
    pub lookback_days: u32,
    /// How many hours of newly closed alerts each run processes.
    pub batch_hours: u32,
    /// Minimum non-empty resolutions before consensus is trusted.
    pub min_sample_size: usize,
    /// Majority-ratio floor for "strong" consensus.
    pub strong_consensus_threshold: f64,
    /// Minimum Jaccard score for two templates to count as related.
    pub similarity_threshold: f64,
    /// Maximum related-template entries attached to a finding.
    pub max_related: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            lookback_days: 90,
            batch_hours: 24,
            min_sample_size: 20,
            strong_consensus_threshold: 0.90,
            similarity_threshold: 0.70,
            max_related: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QaConfig::default();
        assert_eq!(config.lookback_days, 90);
        assert_eq!(config.min_sample_size, 20);
        assert_eq!(config.strong_consensus_threshold, 0.90);
        assert_eq!(config.similarity_threshold, 0.70);
        assert_eq!(config.max_related, 3);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: QaConfig = serde_json::from_str(r#"{"min_sample_size": 10}"#).unwrap();
        assert_eq!(config.min_sample_size, 10);
        assert_eq!(config.lookback_days, 90);
    }
}
