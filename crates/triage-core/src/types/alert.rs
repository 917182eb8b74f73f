//! The flattened alert record consumed by the analysis engine.

use serde::{Deserialize, Serialize};

use super::labels::ResolutionLabel;

/// A closed alert, flattened by the fetching layer.
///
/// Nested vendor structures (parent process details, device info) are
/// hoisted to top-level fields before the record reaches this crate. The
/// engine never mutates a record; absent fields mean "no data", not an
/// error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertRecord {
    /// Vendor alert identifier.
    pub alert_id: Option<String>,
    /// Coarse behavioral category key. Alerts without one cannot
    /// participate in pattern-scoped consensus.
    pub pattern_id: Option<i64>,
    /// Human-readable detection name.
    pub display_name: Option<String>,
    /// Raw command line of the triggering process.
    pub cmdline: Option<String>,
    /// Filename of the triggering process.
    pub filename: Option<String>,
    /// Filename of the parent process.
    pub parent_filename: Option<String>,
    /// The analyst's closing resolution.
    pub resolution: Option<ResolutionLabel>,
    /// Host the alert fired on.
    pub hostname: Option<String>,
    /// Analyst who closed the alert.
    pub assigned_to: Option<String>,
    /// Deep link back into the vendor console.
    pub alert_link: Option<String>,
    /// Vendor creation timestamp, passed through verbatim.
    pub created_timestamp: Option<String>,
}
