//! The drift-analysis pipeline.
//!
//! Composes the sanitizer, consensus engine, and similarity index into a
//! single pass over one batch of newly closed alerts plus its historical
//! baseline. Purely in-memory; fetching the alerts and rendering the
//! report belong to the surrounding layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use triage_core::{AlertRecord, ConfigError, FxHashMap, QaConfig, ResolutionLabel, Severity};

use crate::consensus::{ConsensusEngine, ConsensusResult, ContradictionVerdict};
use crate::similarity::SimilarityIndex;
use crate::template::{hash_template, TemplateSanitizer};

/// A related historical template attached to a finding for context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedPattern {
    pub template_hash: String,
    pub similarity: f64,
    /// Majority resolution of the related template, when it has one.
    pub historical_consensus: Option<ResolutionLabel>,
    pub sample_size: usize,
    pub strength: Option<crate::consensus::ConsensusStrength>,
    /// Tokens present in exactly one of the two templates.
    pub differentiating_tokens: Vec<String>,
    pub shared_tokens: Vec<String>,
}

/// One noteworthy alert: a contradiction, or an INFO-level observation
/// (novel pattern, sparse history).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub alert_id: Option<String>,
    pub pattern_id: Option<i64>,
    pub display_name: Option<String>,
    pub hostname: Option<String>,
    pub template_hash: String,
    pub cmdline: Option<String>,
    pub filename: Option<String>,
    pub parent_filename: Option<String>,
    pub assigned_to: Option<String>,
    pub alert_link: Option<String>,
    pub created_timestamp: Option<String>,
    pub verdict: ContradictionVerdict,
    pub related_patterns: Vec<RelatedPattern>,
}

/// Run counters for the report header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub total_processed: usize,
    pub matches_consensus: usize,
    pub contradictions: usize,
    pub novel_patterns: usize,
    pub insufficient_data: usize,
    pub by_severity: BTreeMap<Severity, usize>,
}

/// The full output of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub findings: Vec<Finding>,
    pub stats: RunStats,
}

/// End-to-end resolution-drift detector for one batch of alerts.
///
/// Holds the sanitizer and consensus engine; the similarity index is
/// rebuilt from the historical baseline on every run and discarded with
/// the report.
pub struct DriftAnalyzer {
    config: QaConfig,
    sanitizer: TemplateSanitizer,
    engine: ConsensusEngine,
}

impl DriftAnalyzer {
    /// Create an analyzer, failing fast on invalid configuration.
    pub fn new(config: QaConfig) -> Result<Self, ConfigError> {
        // Surfaces threshold errors at construction instead of first use.
        SimilarityIndex::new(config.similarity_threshold)?;

        let engine = ConsensusEngine::from_config(&config);
        Ok(Self {
            config,
            sanitizer: TemplateSanitizer::new(),
            engine,
        })
    }

    /// Analyze a batch of newly closed alerts against a historical
    /// baseline.
    pub fn analyze(
        &self,
        current: &[AlertRecord],
        historical: &[AlertRecord],
    ) -> Result<DriftReport, ConfigError> {
        let mut index = SimilarityIndex::new(self.config.similarity_threshold)?;
        let mut resolution_groups: FxHashMap<String, Vec<Option<ResolutionLabel>>> =
            FxHashMap::default();

        for alert in historical {
            // Alerts without a pattern id cannot participate in
            // pattern-scoped consensus.
            let Some(pattern_id) = alert.pattern_id else {
                continue;
            };

            let template = self.sanitizer.generate_template(alert);
            let template_hash = hash_template(&template);

            resolution_groups
                .entry(template_hash.clone())
                .or_default()
                .push(alert.resolution);
            index.index_template(&template_hash, &template, pattern_id);
        }

        let consensus_lookup: FxHashMap<String, ConsensusResult> = resolution_groups
            .into_iter()
            .map(|(hash, resolutions)| (hash, self.engine.calculate_consensus(&resolutions)))
            .collect();

        tracing::debug!(
            templates = consensus_lookup.len(),
            patterns = index.patterns_indexed(),
            "built consensus baseline and similarity index"
        );

        let mut findings = Vec::new();
        let mut stats = RunStats {
            total_processed: current.len(),
            ..RunStats::default()
        };

        let fallback = ConsensusResult::no_data();

        for alert in current {
            let template = self.sanitizer.generate_template(alert);
            let template_hash = hash_template(&template);

            let consensus = consensus_lookup.get(&template_hash).unwrap_or(&fallback);
            let verdict = self.engine.detect_contradiction(alert.resolution, consensus);

            if let Some(severity) = verdict.severity {
                *stats.by_severity.entry(severity).or_insert(0) += 1;
            }
            if verdict.is_contradiction {
                stats.contradictions += 1;
            } else {
                match verdict.reason.as_str() {
                    "matches_consensus" => stats.matches_consensus += 1,
                    "novel_pattern" => stats.novel_patterns += 1,
                    "insufficient_historical_data" => stats.insufficient_data += 1,
                    _ => {}
                }
            }

            let noteworthy = verdict.is_contradiction || verdict.severity == Some(Severity::Info);
            if !noteworthy {
                continue;
            }

            let related_patterns = match alert.pattern_id {
                Some(pattern_id) => self.related_patterns(
                    &index,
                    &consensus_lookup,
                    &template_hash,
                    &template,
                    pattern_id,
                ),
                None => Vec::new(),
            };

            findings.push(Finding {
                alert_id: alert.alert_id.clone(),
                pattern_id: alert.pattern_id,
                display_name: alert.display_name.clone(),
                hostname: alert.hostname.clone(),
                template_hash,
                cmdline: alert.cmdline.clone(),
                filename: alert.filename.clone(),
                parent_filename: alert.parent_filename.clone(),
                assigned_to: alert.assigned_to.clone(),
                alert_link: alert.alert_link.clone(),
                created_timestamp: alert.created_timestamp.clone(),
                verdict,
                related_patterns,
            });
        }

        tracing::info!(
            total = stats.total_processed,
            contradictions = stats.contradictions,
            matches = stats.matches_consensus,
            novel = stats.novel_patterns,
            insufficient = stats.insufficient_data,
            "drift analysis complete"
        );

        Ok(DriftReport { findings, stats })
    }

    /// Enrich a finding with consensus context for similar templates.
    fn related_patterns(
        &self,
        index: &SimilarityIndex,
        consensus_lookup: &FxHashMap<String, ConsensusResult>,
        template_hash: &str,
        template: &str,
        pattern_id: i64,
    ) -> Vec<RelatedPattern> {
        index
            .find_similar(template_hash, template, pattern_id, self.config.max_related)
            .into_iter()
            .map(|m| {
                let consensus = consensus_lookup.get(&m.template_hash);
                RelatedPattern {
                    similarity: m.similarity,
                    historical_consensus: consensus.and_then(|c| c.majority_resolution),
                    sample_size: consensus.map_or(0, |c| c.sample_size),
                    strength: consensus.and_then(|c| c.strength),
                    differentiating_tokens: m
                        .unique_to_query
                        .iter()
                        .chain(m.unique_to_match.iter())
                        .cloned()
                        .collect(),
                    shared_tokens: m.shared_tokens.iter().cloned().collect(),
                    template_hash: m.template_hash,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(
        pattern_id: i64,
        cmdline: &str,
        resolution: Option<ResolutionLabel>,
    ) -> AlertRecord {
        AlertRecord {
            alert_id: Some(format!("alert-{pattern_id}-{cmdline:.8}")),
            pattern_id: Some(pattern_id),
            cmdline: Some(cmdline.to_string()),
            filename: Some("powershell.exe".to_string()),
            parent_filename: Some("explorer.exe".to_string()),
            resolution,
            ..Default::default()
        }
    }

    fn analyzer(min_sample_size: usize) -> DriftAnalyzer {
        let config = QaConfig {
            min_sample_size,
            ..QaConfig::default()
        };
        DriftAnalyzer::new(config).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = QaConfig {
            similarity_threshold: 1.5,
            ..QaConfig::default()
        };
        assert!(DriftAnalyzer::new(config).is_err());
    }

    #[test]
    fn test_contradiction_detected_end_to_end() {
        let historical: Vec<AlertRecord> = (0..30)
            .map(|_| alert(101, "whoami /all", Some(ResolutionLabel::TruePositive)))
            .collect();
        let current = vec![alert(101, "whoami /all", Some(ResolutionLabel::FalsePositive))];

        let report = analyzer(20).analyze(&current, &historical).unwrap();

        assert_eq!(report.stats.contradictions, 1);
        assert_eq!(report.findings.len(), 1);
        let verdict = &report.findings[0].verdict;
        assert!(verdict.is_contradiction);
        assert_eq!(verdict.severity, Some(Severity::Critical));
        assert_eq!(report.stats.by_severity[&Severity::Critical], 1);
    }

    #[test]
    fn test_matching_resolution_produces_no_finding() {
        let historical: Vec<AlertRecord> = (0..30)
            .map(|_| alert(101, "whoami /all", Some(ResolutionLabel::TruePositive)))
            .collect();
        let current = vec![alert(101, "whoami /all", Some(ResolutionLabel::TruePositive))];

        let report = analyzer(20).analyze(&current, &historical).unwrap();

        assert_eq!(report.stats.matches_consensus, 1);
        assert_eq!(report.stats.contradictions, 0);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_novel_pattern_reported_as_info() {
        let report = analyzer(20)
            .analyze(
                &[alert(999, "certutil -urlcache", Some(ResolutionLabel::Ignored))],
                &[],
            )
            .unwrap();

        assert_eq!(report.stats.novel_patterns, 1);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].verdict.severity, Some(Severity::Info));
        assert_eq!(report.findings[0].verdict.reason, "novel_pattern");
    }

    #[test]
    fn test_insufficient_history_reported_as_info() {
        let historical: Vec<AlertRecord> = (0..5)
            .map(|_| alert(101, "whoami /all", Some(ResolutionLabel::TruePositive)))
            .collect();
        let current = vec![alert(101, "whoami /all", Some(ResolutionLabel::FalsePositive))];

        let report = analyzer(20).analyze(&current, &historical).unwrap();

        assert_eq!(report.stats.insufficient_data, 1);
        assert_eq!(report.stats.contradictions, 0);
        assert_eq!(report.findings[0].verdict.reason, "insufficient_historical_data");
    }

    #[test]
    fn test_historical_alerts_without_pattern_id_skipped() {
        let mut historical: Vec<AlertRecord> = (0..30)
            .map(|_| alert(101, "whoami /all", Some(ResolutionLabel::TruePositive)))
            .collect();
        for record in &mut historical {
            record.pattern_id = None;
        }
        let current = vec![alert(101, "whoami /all", Some(ResolutionLabel::FalsePositive))];

        let report = analyzer(20).analyze(&current, &historical).unwrap();

        // With all history skipped, the current alert is novel.
        assert_eq!(report.stats.novel_patterns, 1);
        assert_eq!(report.stats.contradictions, 0);
    }

    #[test]
    fn test_related_patterns_attached_to_contradictions() {
        // Same pattern, one diverging token: similar but not identical.
        let mut historical: Vec<AlertRecord> = (0..30)
            .map(|_| {
                alert(
                    101,
                    "powershell.exe -nop -w hidden -c calc",
                    Some(ResolutionLabel::TruePositive),
                )
            })
            .collect();
        historical.extend((0..30).map(|_| {
            alert(
                101,
                "powershell.exe -nop -w hidden -c notepad",
                Some(ResolutionLabel::FalsePositive),
            )
        }));

        let current = vec![alert(
            101,
            "powershell.exe -nop -w hidden -c calc",
            Some(ResolutionLabel::FalsePositive),
        )];

        let report = analyzer(20).analyze(&current, &historical).unwrap();

        assert_eq!(report.findings.len(), 1);
        let related = &report.findings[0].related_patterns;
        assert_eq!(related.len(), 1);
        assert_eq!(
            related[0].historical_consensus,
            Some(ResolutionLabel::FalsePositive)
        );
        assert_eq!(related[0].sample_size, 30);
        assert!(related[0].similarity >= 0.70);
    }

    #[test]
    fn test_stats_total_counts_every_alert() {
        let current = vec![
            alert(1, "whoami", Some(ResolutionLabel::TruePositive)),
            alert(2, "hostname", None),
            alert(3, "net user", Some(ResolutionLabel::Ignored)),
        ];
        let report = analyzer(20).analyze(&current, &[]).unwrap();
        assert_eq!(report.stats.total_processed, 3);
    }
}
