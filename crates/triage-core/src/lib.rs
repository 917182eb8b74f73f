//! # triage-core
//!
//! Foundation crate for the resolution-drift triage engine.
//! Defines the shared types, configuration, and errors.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::QaConfig;
pub use errors::error_code::TriageErrorCode;
pub use errors::ConfigError;
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::{AlertRecord, ResolutionLabel, Severity};
