//! Filer name rules that are not part of key normalization: trade-name
//! (d/b/a) splitting and exclusion of government filers.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::TARGET_ENTITY;

/// Trade-name patterns, tried in order. Each captures the legal name and the
/// trade name. The slashes in `d/b/a` are optional so `dba` also matches.
pub const DBA_PATTERNS: &[&str] = &[
    r"(?i)^(?P<primary>.+?)\s+d/?b/?a\s+(?P<dba>.+)$",
    r"(?i)^(?P<primary>.+?)\s+doing\s+business\s+as\s+(?P<dba>.+)$",
];

/// Lowercase name fragments of government bodies that show up as filers.
/// Any filer name containing one of these is not a company.
pub const GOVERNMENT_FRAGMENTS: &[&str] = &[
    "wireline competition bureau",
    "federal communications commission",
    "fcc",
    "u.s. department",
    "department of justice",
];

lazy_static! {
    static ref DBA_REGEXES: Vec<Regex> = DBA_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect();
}

/// Split "Legal Name d/b/a Trade Name" into its parts.
///
/// Returns the untouched input and `None` when no pattern matches.
pub fn extract_dba(name: &str) -> (String, Option<String>) {
    for re in DBA_REGEXES.iter() {
        if let Some(cap) = re.captures(name) {
            if let (Some(primary), Some(dba)) = (cap.name("primary"), cap.name("dba")) {
                debug!(
                    target: TARGET_ENTITY,
                    "Split '{}' into primary '{}' and d/b/a '{}'",
                    name,
                    primary.as_str().trim(),
                    dba.as_str().trim()
                );
                return (
                    primary.as_str().trim().to_string(),
                    Some(dba.as_str().trim().to_string()),
                );
            }
        }
    }

    (name.to_string(), None)
}

/// True when the filer is a known government body.
pub fn is_excluded_filer(name: &str) -> bool {
    let lowered = name.to_lowercase();
    GOVERNMENT_FRAGMENTS
        .iter()
        .any(|fragment| lowered.contains(fragment))
}
