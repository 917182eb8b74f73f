//! The pattern-scoped similarity index.

use std::collections::BTreeSet;

use triage_core::{ConfigError, FxHashMap, FxHashSet};

use super::types::{SimilarMatch, SimilarityQuery};

/// Finds similar templates using Jaccard similarity on token sets.
///
/// Primary key is the template hash; `pattern_id → hashes` is a derived
/// reverse index maintained alongside inserts. The intended lifecycle is
/// strictly phase-separated: index every historical template, then issue
/// lookups. No lookup mutates state, so a fully built index is safe to
/// share across threads read-only.
pub struct SimilarityIndex {
    threshold: f64,
    template_tokens: FxHashMap<String, BTreeSet<String>>,
    template_raw: FxHashMap<String, String>,
    pattern_hashes: FxHashMap<i64, FxHashSet<String>>,
}

impl SimilarityIndex {
    /// Create an index. `similarity_threshold` must lie in (0, 1]; this
    /// is the only construction-time validation in the analysis core.
    pub fn new(similarity_threshold: f64) -> Result<Self, ConfigError> {
        if !(similarity_threshold > 0.0 && similarity_threshold <= 1.0) {
            return Err(ConfigError::InvalidSimilarityThreshold {
                value: similarity_threshold,
            });
        }

        Ok(Self {
            threshold: similarity_threshold,
            template_tokens: FxHashMap::default(),
            template_raw: FxHashMap::default(),
            pattern_hashes: FxHashMap::default(),
        })
    }

    /// The configured similarity threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Add a template. Indexing the same hash twice is idempotent
    /// (last write wins).
    pub fn index_template(&mut self, template_hash: &str, template: &str, pattern_id: i64) {
        self.template_tokens
            .insert(template_hash.to_string(), tokenize(template));
        self.template_raw
            .insert(template_hash.to_string(), template.to_string());
        self.pattern_hashes
            .entry(pattern_id)
            .or_default()
            .insert(template_hash.to_string());
    }

    /// Number of templates in the index.
    pub fn index_count(&self) -> usize {
        self.template_tokens.len()
    }

    /// Number of distinct pattern ids in the index.
    pub fn patterns_indexed(&self) -> usize {
        self.pattern_hashes.len()
    }

    /// Find indexed templates similar to the query.
    ///
    /// Candidates come only from the query's own `pattern_id`; similarity
    /// across detection patterns is semantically meaningless and is never
    /// computed. The query's own hash is excluded. Results at or above the
    /// threshold are sorted by similarity descending and truncated to
    /// `max_results`; the order of equal scores follows the underlying
    /// map iteration and is implementation-defined.
    pub fn find_similar(
        &self,
        template_hash: &str,
        template: &str,
        pattern_id: i64,
        max_results: usize,
    ) -> Vec<SimilarMatch> {
        let query_tokens = tokenize(template);

        let Some(candidate_hashes) = self.pattern_hashes.get(&pattern_id) else {
            return Vec::new();
        };

        let mut candidates: Vec<SimilarMatch> = candidate_hashes
            .iter()
            .filter(|hash| hash.as_str() != template_hash)
            .filter_map(|hash| {
                let other_tokens = self.template_tokens.get(hash)?;
                let similarity = jaccard_similarity(&query_tokens, other_tokens);
                if similarity < self.threshold {
                    return None;
                }
                Some(SimilarMatch {
                    template_hash: hash.clone(),
                    template: self.template_raw.get(hash).cloned().unwrap_or_default(),
                    similarity,
                    shared_tokens: query_tokens.intersection(other_tokens).cloned().collect(),
                    unique_to_query: query_tokens.difference(other_tokens).cloned().collect(),
                    unique_to_match: other_tokens.difference(&query_tokens).cloned().collect(),
                    pattern_id,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(max_results);
        candidates
    }

    /// Batched `find_similar` with identical per-query semantics, keyed by
    /// each query's template hash.
    pub fn find_similar_batch(
        &self,
        queries: &[SimilarityQuery],
        max_results_per_query: usize,
    ) -> FxHashMap<String, Vec<SimilarMatch>> {
        queries
            .iter()
            .map(|query| {
                (
                    query.template_hash.clone(),
                    self.find_similar(
                        &query.template_hash,
                        &query.template,
                        query.pattern_id,
                        max_results_per_query,
                    ),
                )
            })
            .collect()
    }
}

/// Lowercase and split a template into its token set.
///
/// Splits on whitespace and the delimiters `\ / - . , ; : =`; tokens of
/// length ≤ 1 are noise and dropped.
pub fn tokenize(template: &str) -> BTreeSet<String> {
    template
        .to_lowercase()
        .split(|c: char| {
            c.is_whitespace() || matches!(c, '\\' | '/' | '-' | '.' | ',' | ';' | ':' | '=')
        })
        .filter(|token| token.len() > 1)
        .map(str::to_string)
        .collect()
}

/// Jaccard index: |A ∩ B| / |A ∪ B|.
///
/// Returns 0.0 when either set is empty: "no information" must not read
/// as "identical".
pub fn jaccard_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}
