//! Historical consensus and contradiction detection.
//!
//! - `types.rs` — consensus status/strength enums and result structs
//! - `engine.rs` — majority calculation, Wilson intervals, severity table

pub mod engine;
pub mod types;

pub use engine::ConsensusEngine;
pub use types::{ConsensusResult, ConsensusStatus, ConsensusStrength, ContradictionVerdict};
