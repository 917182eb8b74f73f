//! Types for similarity lookups.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A template that is similar but not identical to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarMatch {
    pub template_hash: String,
    /// The matched template, verbatim as indexed.
    pub template: String,
    /// Jaccard score in (0, 1].
    pub similarity: f64,
    pub shared_tokens: BTreeSet<String>,
    pub unique_to_query: BTreeSet<String>,
    pub unique_to_match: BTreeSet<String>,
    pub pattern_id: i64,
}

/// One query in a batched similarity lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityQuery {
    pub template_hash: String,
    pub template: String,
    pub pattern_id: i64,
}
