//! Workspace configuration.

pub mod qa_config;

pub use qa_config::QaConfig;
