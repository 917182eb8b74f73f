//! The ordered sanitization rule table.
//!
//! Rule order is part of the contract. Well-known SID replacement runs
//! before everything else so the generic domain-SID pattern cannot consume
//! a well-known identifier's numeric suffix, and the broad mixed
//! alphanumeric rule runs last so it cannot swallow tokens meant for the
//! more specific rules. Reordering entries changes classification.

/// A single sanitization rule.
///
/// `pattern` is compiled case-insensitively. When
/// `require_letter_and_digit` is set, a match is only replaced if it
/// contains at least one letter and one digit (the regex crate has no
/// lookahead, so the mixed-content check happens at replacement time).
#[derive(Debug, Clone, Copy)]
pub struct SanitizeRule {
    pub label: &'static str,
    pub pattern: &'static str,
    pub replacement: &'static str,
    pub require_letter_and_digit: bool,
}

/// Well-known security identifiers, replaced with semantic name tokens
/// before any regex rule runs.
pub const WELL_KNOWN_SIDS: &[(&str, &str)] = &[
    // Universal
    ("S-1-1-0", "<Everyone>"),
    // Logon types
    ("S-1-5-2", "<Network>"),
    ("S-1-5-3", "<Batch>"),
    ("S-1-5-4", "<Interactive>"),
    ("S-1-5-6", "<Service>"),
    ("S-1-5-7", "<Anonymous>"),
    // Special identities
    ("S-1-5-11", "<AuthenticatedUsers>"),
    ("S-1-5-113", "<LocalAccount>"),
    ("S-1-5-114", "<LocalAccountAndAdministrator>"),
    // Local service accounts
    ("S-1-5-18", "<LocalSystem>"),
    ("S-1-5-19", "<LocalService>"),
    ("S-1-5-20", "<NetworkService>"),
    // Built-in groups (S-1-5-32-xxx)
    ("S-1-5-32-544", "<Administrators>"),
    ("S-1-5-32-545", "<Users>"),
    ("S-1-5-32-546", "<Guests>"),
    ("S-1-5-32-547", "<PowerUsers>"),
    ("S-1-5-32-548", "<AccountOperators>"),
    ("S-1-5-32-549", "<ServerOperators>"),
    ("S-1-5-32-550", "<PrintOperators>"),
    ("S-1-5-32-551", "<BackupOperators>"),
];

/// The default sanitization rules, in application order.
pub fn default_rules() -> Vec<SanitizeRule> {
    vec![
        SanitizeRule {
            label: "ipv4-address",
            pattern: r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b",
            replacement: "<IP>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "ipv6-address",
            pattern: r"\b(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}\b",
            replacement: "<IP>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "guid",
            pattern: r"\{?[a-fA-F0-9]{8}(?:-[a-fA-F0-9]{4}){3}-[a-fA-F0-9]{12}\}?",
            replacement: "<GUID>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "windows-temp-path",
            pattern: r#"[Cc]:\\(?:Users\\[^\\]+\\AppData\\Local\\Temp|Windows\\Temp|Temp)\\[^\s"']+"#,
            replacement: "<TEMP>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "linux-temp-path",
            pattern: r#"/(?:tmp|var/tmp)/[^\s"']+"#,
            replacement: "<TEMP>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "url-hostname",
            // Protocol prefix is preserved; only the host is masked.
            pattern: r"(https?://)(?:[a-zA-Z0-9][-a-zA-Z0-9]*\.)+[a-zA-Z]{2,}",
            replacement: "${1}<HOST>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "iso-timestamp",
            pattern: r"\b\d{4}[-/]\d{2}[-/]\d{2}[T\s]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?\b",
            replacement: "<TIME>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "unix-timestamp",
            // 10-13 digits starting with 1 (current-era epoch seconds/millis).
            pattern: r"\b1[0-9]{9,12}\b",
            replacement: "<TIME>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "base64-data",
            // 20+ chars to reduce false positives.
            pattern: r"\b[A-Za-z0-9+/]{20,}={0,2}\b",
            replacement: "<DATA>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "long-hex",
            // 32+ chars covers hashes and encoded data.
            pattern: r"\b[0-9a-fA-F]{32,}\b",
            replacement: "<HEX>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "domain-sid",
            // After well-known SID replacement has removed exact matches.
            pattern: r"S-1-5-21-\d+-\d+-\d+(?:-\d+)?",
            replacement: "<SID>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "process-id",
            pattern: r"\bpid[:\s]+\d+\b",
            replacement: "<PID>",
            require_letter_and_digit: false,
        },
        SanitizeRule {
            label: "random-alphanumeric",
            // Broadest pattern, runs last.
            pattern: r"\b[A-Za-z0-9]{12,}\b",
            replacement: "<RAND>",
            require_letter_and_digit: true,
        },
    ]
}
