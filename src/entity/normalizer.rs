//! Company name normalization.
//!
//! `normalize` maps a raw filer name onto the key used to group filings that
//! belong to one legal entity. The steps run in a fixed order:
//!
//! 1. lowercase and trim
//! 2. rewrite the trailing corporate suffix using the first matching rule of
//!    [`SUFFIX_RULES`]
//! 3. collapse whitespace runs to a single space
//! 4. strip trailing commas and periods
//!
//! The result is a fixed point: `normalize(normalize(x)) == normalize(x)`.
//! Record building re-derives keys from already elected names, so this must
//! hold for every input.

use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use tracing::trace;

use super::TARGET_ENTITY;

/// Ordered suffix rewrite table: `(trailing pattern, canonical suffix)`.
///
/// Patterns run against the lowercased name and are anchored at end of
/// string. Each one starts at a word boundary so "pllc" is never read as
/// "p" + "llc", swallows any separating whitespace/commas in front of the
/// suffix and any periods/commas/whitespace after it. Only the first matching
/// rule is applied, so longer suffixes sharing letters with shorter ones
/// (PLLC/LLC, LLP/LP) must come first.
pub const SUFFIX_RULES: &[(&str, &str)] = &[
    (
        r"[\s,]*\b(?:p\.?l\.?l\.?c|professional\s+limited\s+liability\s+company)[.,\s]*$",
        "pllc",
    ),
    (
        r"[\s,]*\b(?:l\.?l\.?c|limited\s+liability\s+company)[.,\s]*$",
        "llc",
    ),
    (
        r"[\s,]*\b(?:l\.?l\.?p|limited\s+liability\s+partnership)[.,\s]*$",
        "llp",
    ),
    (r"[\s,]*\b(?:l\.?p|limited\s+partnership)[.,\s]*$", "lp"),
    (r"[\s,]*\b(?:inc|incorporated)[.,\s]*$", "inc"),
    (r"[\s,]*\b(?:corp|corporation)[.,\s]*$", "corp"),
    (r"[\s,]*\b(?:ltd|limited)[.,\s]*$", "ltd"),
    (r"[\s,]*\b(?:co|company)[.,\s]*$", "co"),
];

lazy_static! {
    static ref COMPILED_SUFFIX_RULES: Vec<(Regex, &'static str)> = SUFFIX_RULES
        .iter()
        .filter_map(|(pattern, canonical)| Regex::new(pattern).ok().map(|re| (re, *canonical)))
        .collect();
}

/// Index into [`SUFFIX_RULES`] of the rule that applies to an already
/// lowercased name, if any.
pub fn matching_suffix_rule(lowercased: &str) -> Option<usize> {
    COMPILED_SUFFIX_RULES
        .iter()
        .position(|(re, _)| re.is_match(lowercased))
}

fn rewrite_suffix(lowercased: &str) -> String {
    for (re, canonical) in COMPILED_SUFFIX_RULES.iter() {
        if re.is_match(lowercased) {
            let replacement = format!(" {}", canonical);
            return re.replace(lowercased, NoExpand(&replacement)).into_owned();
        }
    }
    lowercased.to_string()
}

/// Normalize a company name into its equivalence key.
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let lowered = lowered.trim();
    if lowered.is_empty() {
        return String::new();
    }

    let rewritten = rewrite_suffix(lowered);

    let collapsed = rewritten.split_whitespace().collect::<Vec<_>>().join(" ");

    let normalized = collapsed
        .trim_end_matches(|c: char| c == ',' || c == '.' || c.is_whitespace())
        .to_string();

    trace!(target: TARGET_ENTITY, "Normalized '{}' to '{}'", name, normalized);

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_suffix_rules_compile() {
        assert_eq!(COMPILED_SUFFIX_RULES.len(), SUFFIX_RULES.len());
    }

    #[test]
    fn test_basic_normalization() {
        assert_eq!(normalize("Acme, L.L.C."), "acme llc");
        assert_eq!(normalize("ACME INC"), "acme inc");
        assert_eq!(normalize("Acme   Co."), "acme co");
        assert_eq!(normalize("  Acme VoIP LLC  "), "acme voip llc");
        assert_eq!(normalize("ACME VOIP, L.L.C."), "acme voip llc");
    }

    #[test]
    fn test_punctuation_variants_share_a_key() {
        let variants = [
            "Acme Inc",
            "ACME, INC.",
            "Acme Inc.",
            "acme,inc",
            "Acme Incorporated",
        ];
        for variant in &variants {
            assert_eq!(normalize(variant), "acme inc", "variant '{}'", variant);
        }

        for variant in &["Beta LLC", "Beta, L.L.C.", "Beta llc.", "Beta Limited Liability Company"] {
            assert_eq!(normalize(variant), "beta llc", "variant '{}'", variant);
        }
    }

    #[test]
    fn test_each_suffix_family() {
        assert_eq!(normalize("Gamma P.L.L.C."), "gamma pllc");
        assert_eq!(normalize("Gamma PLLC"), "gamma pllc");
        assert_eq!(normalize("Delta L.L.P."), "delta llp");
        assert_eq!(normalize("Delta, LLP"), "delta llp");
        assert_eq!(normalize("Epsilon L.P."), "epsilon lp");
        assert_eq!(normalize("Epsilon Limited Partnership"), "epsilon lp");
        assert_eq!(normalize("Zeta Corp."), "zeta corp");
        assert_eq!(normalize("Zeta Corporation"), "zeta corp");
        assert_eq!(normalize("Eta Ltd."), "eta ltd");
        assert_eq!(normalize("Eta Limited"), "eta ltd");
        assert_eq!(normalize("Theta & Co."), "theta & co");
        assert_eq!(normalize("Theta Company"), "theta co");
    }

    #[test]
    fn test_rule_order_is_first_match_only() {
        // PLLC is checked before LLC; LLP before LP
        assert_eq!(matching_suffix_rule("gamma p.l.l.c."), Some(0));
        assert_eq!(matching_suffix_rule("gamma llc"), Some(1));
        assert_eq!(matching_suffix_rule("delta l.l.p."), Some(2));
        assert_eq!(matching_suffix_rule("epsilon l.p."), Some(3));
        assert_eq!(matching_suffix_rule("acme voip"), None);

        // Only the final suffix is rewritten
        assert_eq!(normalize("Acme Co., Inc."), "acme co. inc");
    }

    #[test]
    fn test_suffix_letters_inside_words_are_left_alone() {
        assert_eq!(normalize("Telco"), "telco");
        assert_eq!(normalize("Mobilinc"), "mobilinc");
        assert_eq!(normalize("Cosmic Co-op"), "cosmic co-op");
        assert_eq!(normalize("Help"), "help");
    }

    #[test]
    fn test_compound_qualifiers_only_rewrite_the_tail() {
        assert_eq!(
            normalize("X LLC, a subsidiary of Y Corp"),
            "x llc, a subsidiary of y corp"
        );
        assert_eq!(
            normalize("X LLC, a subsidiary of Y Corp."),
            normalize("x llc, a subsidiary of y corporation")
        );
        assert_ne!(normalize("X LLC, a subsidiary of Y Corp"), normalize("X LLC"));
    }

    #[test]
    fn test_trailing_punctuation_and_whitespace() {
        assert_eq!(normalize("Acme VoIP."), "acme voip");
        assert_eq!(normalize("Acme VoIP ,"), "acme voip");
        assert_eq!(normalize("Acme\t\tVoIP"), "acme voip");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("LLC"), "llc");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_idempotence() {
        let samples = [
            "Acme, L.L.C.",
            "ACME INC",
            "Acme   Co.",
            "Acme, , Inc.",
            "Acme, inc.,",
            "Acme Inc .",
            "Acme l. l.p.",
            "Acme d.co.",
            "Acme Co., Inc.",
            "X LLC, a subsidiary of Y Corp",
            "Professional Limited Liability Company",
            "Beta Limited Liability Partnership",
            "Gamma p.l.l.c",
            "Wireline Competition Bureau",
            "Acme VoIP d/b/a Rocket Phone, LLC",
            "  ",
            ",inc",
            "Ünïcode Çorp.",
        ];

        for sample in &samples {
            let once = normalize(sample);
            let twice = normalize(&once);
            assert_eq!(once, twice, "normalize is not idempotent for '{}'", sample);
        }
    }
}
