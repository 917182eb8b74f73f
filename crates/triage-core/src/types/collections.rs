//! Collection type aliases.
//!
//! FxHash maps are used throughout the workspace; keys are short strings
//! (template hashes) and small integers (pattern ids).

pub use rustc_hash::{FxHashMap, FxHashSet};
