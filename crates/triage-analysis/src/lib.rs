//! # triage-analysis
//!
//! Resolution-drift analysis engine for alert triage QA.
//! Contains the template sanitizer, consensus statistics, similarity
//! index, and the pipeline that composes them into a drift report.

pub mod consensus;
pub mod pipeline;
pub mod similarity;
pub mod template;

pub use consensus::{ConsensusEngine, ConsensusResult, ContradictionVerdict};
pub use pipeline::{DriftAnalyzer, DriftReport, Finding, RunStats};
pub use similarity::{SimilarMatch, SimilarityIndex};
pub use template::{hash_template, TemplateSanitizer};
