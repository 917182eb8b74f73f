//! Behavioral template generation.
//!
//! Collapses noisy, high-cardinality alert fields into stable fingerprint
//! strings that can be grouped and compared:
//! - `rules.rs` — the ordered sanitization rule table and well-known SID map
//! - `sanitizer.rs` — rule application, template assembly, content hashing

pub mod rules;
pub mod sanitizer;

pub use sanitizer::{hash_template, TemplateSanitizer};
