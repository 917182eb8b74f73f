//! End-to-end drift-detection scenarios across all three components.

use triage_analysis::consensus::{ConsensusEngine, ConsensusStatus, ConsensusStrength};
use triage_analysis::pipeline::DriftAnalyzer;
use triage_analysis::similarity::SimilarityIndex;
use triage_analysis::template::{hash_template, TemplateSanitizer};
use triage_core::{AlertRecord, QaConfig, ResolutionLabel, Severity};

fn resolutions(tp: usize, fp: usize) -> Vec<Option<ResolutionLabel>> {
    let mut out = vec![Some(ResolutionLabel::TruePositive); tp];
    out.extend(vec![Some(ResolutionLabel::FalsePositive); fp]);
    out
}

// ─── Consensus → contradiction chain ───────────────────────────────────────

#[test]
fn test_strong_consensus_then_critical_contradiction() {
    let engine = ConsensusEngine::new(20, 0.90);

    let consensus = engine.calculate_consensus(&resolutions(95, 5));
    assert_eq!(consensus.status, ConsensusStatus::Consensus);
    assert_eq!(consensus.ratio, Some(0.95));
    assert_eq!(consensus.strength, Some(ConsensusStrength::Strong));

    let verdict = engine.detect_contradiction(Some(ResolutionLabel::FalsePositive), &consensus);
    assert!(verdict.is_contradiction);
    assert_eq!(verdict.severity, Some(Severity::Critical));
}

#[test]
fn test_sparse_history_never_contradicts() {
    let engine = ConsensusEngine::new(20, 0.90);

    let consensus = engine.calculate_consensus(&resolutions(15, 0));
    assert_eq!(consensus.status, ConsensusStatus::InsufficientData);
    assert_eq!(consensus.sample_size, 15);
    assert!(consensus.strength.is_none());

    let verdict = engine.detect_contradiction(Some(ResolutionLabel::FalsePositive), &consensus);
    assert!(!verdict.is_contradiction);
    assert_eq!(verdict.severity, Some(Severity::Info));
}

// ─── Normalizer → hash grouping ────────────────────────────────────────────

#[test]
fn test_ip_masking_groups_behaviorally_identical_alerts() {
    let sanitizer = TemplateSanitizer::new();

    let masked = sanitizer.sanitize("ping 192.168.1.1");
    assert!(masked.contains("<IP>"));
    assert!(!masked.contains("192.168.1.1"));

    let a = AlertRecord {
        pattern_id: Some(7),
        cmdline: Some("ping 192.168.1.1".to_string()),
        filename: Some("ping.exe".to_string()),
        parent_filename: Some("cmd.exe".to_string()),
        ..Default::default()
    };
    let b = AlertRecord {
        cmdline: Some("ping 10.20.30.40".to_string()),
        ..a.clone()
    };

    let template_a = sanitizer.generate_template(&a);
    let template_b = sanitizer.generate_template(&b);
    assert_eq!(template_a, template_b);
    assert_eq!(hash_template(&template_a), hash_template(&template_b));
}

#[test]
fn test_template_hash_is_stable_across_instances() {
    let a = TemplateSanitizer::new();
    let b = TemplateSanitizer::new();
    let alert = AlertRecord {
        pattern_id: Some(31337),
        cmdline: Some("rundll32 shell32.dll,Control_RunDLL".to_string()),
        ..Default::default()
    };
    assert_eq!(
        hash_template(&a.generate_template(&alert)),
        hash_template(&b.generate_template(&alert)),
    );
}

// ─── Similarity fallback ───────────────────────────────────────────────────

#[test]
fn test_one_token_difference_clears_default_threshold() {
    // Five shared tokens plus one extra on the indexed side: 5/6 ≈ 0.833.
    let mut index = SimilarityIndex::new(0.70).unwrap();
    index.index_template("hash_known", "alpha bravo charlie delta echo foxtrot", 55);

    let results = index.find_similar("hash_query", "alpha bravo charlie delta echo", 55, 5);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].template_hash, "hash_known");
    assert!((results[0].similarity - 5.0 / 6.0).abs() < 1e-9);
}

#[test]
fn test_similarity_is_pattern_scoped_even_for_identical_templates() {
    let mut index = SimilarityIndex::new(0.70).unwrap();
    index.index_template("hash_a", "mshta javascript close", 1);
    index.index_template("hash_b", "mshta javascript close", 2);

    let matches = index.find_similar("hash_q", "mshta javascript close", 1, 5);
    assert!(matches.iter().all(|m| m.pattern_id == 1));
    assert!(matches.iter().all(|m| m.template_hash != "hash_b"));
}

// ─── Full pipeline ─────────────────────────────────────────────────────────

fn history(pattern_id: i64, cmdline: &str, label: ResolutionLabel, n: usize) -> Vec<AlertRecord> {
    (0..n)
        .map(|i| AlertRecord {
            alert_id: Some(format!("hist-{pattern_id}-{i}")),
            pattern_id: Some(pattern_id),
            cmdline: Some(cmdline.to_string()),
            filename: Some("powershell.exe".to_string()),
            parent_filename: Some("services.exe".to_string()),
            resolution: Some(label),
            hostname: Some(format!("ws-{:03}", i % 40)),
            ..Default::default()
        })
        .collect()
}

#[test]
fn test_pipeline_full_run_mixed_outcomes() {
    let mut historical = history(
        101,
        "powershell -enc SGVsbG9Xb3JsZEhlbGxvV29ybGQh",
        ResolutionLabel::TruePositive,
        40,
    );
    historical.extend(history(
        202,
        "schtasks /create /tn updater",
        ResolutionLabel::FalsePositive,
        8,
    ));

    let mut current = history(
        101,
        "powershell -enc SGVsbG9Xb3JsZEhlbGxvV29ybGQh",
        ResolutionLabel::FalsePositive,
        1,
    );
    current.extend(history(
        202,
        "schtasks /create /tn updater",
        ResolutionLabel::FalsePositive,
        1,
    ));
    current.extend(history(303, "bitsadmin /transfer job", ResolutionLabel::Ignored, 1));

    let analyzer = DriftAnalyzer::new(QaConfig::default()).unwrap();
    let report = analyzer.analyze(&current, &historical).unwrap();

    assert_eq!(report.stats.total_processed, 3);
    // Pattern 101: 40x TP history, new FP → critical contradiction.
    assert_eq!(report.stats.contradictions, 1);
    // Pattern 202: only 8 samples → below min_sample_size.
    assert_eq!(report.stats.insufficient_data, 1);
    // Pattern 303: never seen before.
    assert_eq!(report.stats.novel_patterns, 1);
    assert_eq!(report.stats.by_severity[&Severity::Critical], 1);
    assert_eq!(report.stats.by_severity[&Severity::Info], 2);

    // All three outcomes are noteworthy and become findings.
    assert_eq!(report.findings.len(), 3);
    let critical = report
        .findings
        .iter()
        .find(|f| f.verdict.severity == Some(Severity::Critical))
        .expect("critical finding");
    assert_eq!(critical.pattern_id, Some(101));
    assert_eq!(critical.template_hash.len(), 64);
    assert_eq!(
        critical.verdict.historical_resolution,
        Some(ResolutionLabel::TruePositive)
    );
}

#[test]
fn test_pipeline_report_serializes() {
    let historical = history(101, "whoami /all", ResolutionLabel::TruePositive, 25);
    let current = history(101, "whoami /all", ResolutionLabel::FalsePositive, 1);

    let analyzer = DriftAnalyzer::new(QaConfig::default()).unwrap();
    let report = analyzer.analyze(&current, &historical).unwrap();

    let json = serde_json::to_string(&report).expect("report serializes");
    assert!(json.contains("\"CRITICAL\""));
    assert!(json.contains("fp_contradicts_strong_tp_consensus"));
}
