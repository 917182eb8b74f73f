//! Sanitization and template generation.
//!
//! The sanitizer masks variable substrings in command lines with stable
//! placeholder tokens (`<IP>`, `<GUID>`, `<TEMP>`, ...), then assembles a
//! four-segment behavioral template that hashes to a grouping key.

use regex::Regex;
use triage_core::AlertRecord;

use super::rules::{default_rules, SanitizeRule, WELL_KNOWN_SIDS};

struct CompiledRule {
    regex: Regex,
    replacement: &'static str,
    require_letter_and_digit: bool,
}

/// Turns raw alerts into sanitized behavioral templates.
///
/// All rules are compiled once at construction. Every method is total over
/// string input: empty input yields empty output, and nothing here can
/// fail at call time.
pub struct TemplateSanitizer {
    well_known: Vec<(Regex, &'static str)>,
    rules: Vec<CompiledRule>,
}

impl TemplateSanitizer {
    /// Create a sanitizer with the default rule table.
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Create a sanitizer with a custom rule table (applied in order).
    pub fn with_rules(rules: Vec<SanitizeRule>) -> Self {
        let well_known = WELL_KNOWN_SIDS
            .iter()
            .filter_map(|(sid, token)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(sid));
                match Regex::new(&pattern) {
                    Ok(regex) => Some((regex, *token)),
                    Err(err) => {
                        tracing::warn!(sid = %sid, %err, "skipping unparseable well-known SID pattern");
                        None
                    }
                }
            })
            .collect();

        let rules = rules
            .into_iter()
            .filter_map(|rule| match Regex::new(&format!("(?i){}", rule.pattern)) {
                Ok(regex) => Some(CompiledRule {
                    regex,
                    replacement: rule.replacement,
                    require_letter_and_digit: rule.require_letter_and_digit,
                }),
                Err(err) => {
                    tracing::warn!(rule = rule.label, %err, "skipping unparseable sanitization rule");
                    None
                }
            })
            .collect();

        Self { well_known, rules }
    }

    /// Number of compiled rules (well-known SID table excluded).
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Apply all sanitization rules and collapse runs of whitespace.
    pub fn sanitize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        // First pass: well-known SIDs become readable name tokens.
        let mut result = text.to_string();
        for (regex, token) in &self.well_known {
            if regex.is_match(&result) {
                result = regex.replace_all(&result, *token).into_owned();
            }
        }

        // Second pass: the ordered rule table.
        for rule in &self.rules {
            if !rule.regex.is_match(&result) {
                continue;
            }
            result = if rule.require_letter_and_digit {
                rule.regex
                    .replace_all(&result, |caps: &regex::Captures<'_>| {
                        let matched = &caps[0];
                        let has_letter = matched.chars().any(|c| c.is_ascii_alphabetic());
                        let has_digit = matched.chars().any(|c| c.is_ascii_digit());
                        if has_letter && has_digit {
                            rule.replacement.to_string()
                        } else {
                            matched.to_string()
                        }
                    })
                    .into_owned()
            } else {
                rule.regex.replace_all(&result, rule.replacement).into_owned()
            };
        }

        result.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Build the canonical four-segment template for an alert.
    ///
    /// `pattern:<id>|cmd:<sanitized>|file:<name>|parent:<name>`. Every
    /// segment is present even when its field is empty, so structurally
    /// identical but data-sparse alerts still compare equal. Only the
    /// command line is sanitized; the other fields are low-cardinality and
    /// used verbatim. An absent pattern id renders as `0`.
    pub fn generate_template(&self, alert: &AlertRecord) -> String {
        let pattern_id = alert.pattern_id.unwrap_or(0);
        let cmdline = self.sanitize(alert.cmdline.as_deref().unwrap_or(""));
        let filename = alert.filename.as_deref().unwrap_or("");
        let parent = alert.parent_filename.as_deref().unwrap_or("");

        format!("pattern:{pattern_id}|cmd:{cmdline}|file:{filename}|parent:{parent}")
    }
}

impl Default for TemplateSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Content hash of a template: 256-bit digest, 64 lowercase hex chars.
///
/// Pure function of the string, with no salt or per-alert entropy. Identical
/// templates hash identically across calls and across process runs.
pub fn hash_template(template: &str) -> String {
    blake3::hash(template.as_bytes()).to_hex().to_string()
}
