//! Fuzzy template matching.
//!
//! A secondary layer next to exact hash grouping: token-set Jaccard
//! similarity surfaces related templates for novel alerts and for
//! contradictions where extra context helps. Comparisons never cross
//! pattern-id boundaries.

pub mod index;
pub mod types;

pub use index::{jaccard_similarity, tokenize, SimilarityIndex};
pub use types::{SimilarMatch, SimilarityQuery};
