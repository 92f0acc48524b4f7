//! Relevance filter for interconnected VoIP numbering filings.

use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use super::types::{RawFiling, UNKNOWN_SUBMISSION_TYPE};
use super::TARGET_INGEST;

/// Phrases that mark a proceeding as a numbering authorization matter.
/// Matched case-insensitively as substrings of the proceeding description.
pub const PROCEEDING_TRIGGERS: &[&str] = &[
    "interconnected voip numbering",
    "voip numbering authorization application",
    "authorization to obtain numbering resources",
];

/// Substrings that mark a document filename as a numbering filing.
pub const DOCUMENT_MARKERS: &[&str] = &["voip numbering"];

fn contains_any(text: Option<&str>, needles: &[&str]) -> bool {
    let haystack = text.unwrap_or("").to_lowercase();
    needles.iter().any(|needle| haystack.contains(needle))
}

/// True when any proceeding description or document filename matches.
pub fn is_relevant(filing: &RawFiling) -> bool {
    filing
        .proceedings
        .iter()
        .any(|p| contains_any(p.description.as_deref(), PROCEEDING_TRIGGERS))
        || filing
            .documents
            .iter()
            .any(|d| contains_any(d.filename.as_deref(), DOCUMENT_MARKERS))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionTypeCount {
    pub submission_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub total_input: usize,
    pub kept: usize,
    pub dropped: usize,
    /// Kept filings per submission type, most frequent first
    pub by_submission_type: Vec<SubmissionTypeCount>,
}

/// Split filings into the relevant set (input order preserved) and stats.
pub fn classify(filings: Vec<RawFiling>) -> (Vec<RawFiling>, FilterStats) {
    let total_input = filings.len();
    let mut type_counts: HashMap<String, usize> = HashMap::new();

    let kept: Vec<RawFiling> = filings
        .into_iter()
        .filter(is_relevant)
        .inspect(|filing| {
            let submission_type = filing
                .submission_type()
                .unwrap_or(UNKNOWN_SUBMISSION_TYPE)
                .to_string();
            *type_counts.entry(submission_type).or_insert(0) += 1;
        })
        .collect();

    let mut by_submission_type: Vec<SubmissionTypeCount> = type_counts
        .into_iter()
        .map(|(submission_type, count)| SubmissionTypeCount {
            submission_type,
            count,
        })
        .collect();
    by_submission_type.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.submission_type.cmp(&b.submission_type))
    });

    let stats = FilterStats {
        total_input,
        kept: kept.len(),
        dropped: total_input - kept.len(),
        by_submission_type,
    };

    info!(
        target: TARGET_INGEST,
        "Relevance filter kept {} of {} filings ({} dropped)",
        stats.kept, stats.total_input, stats.dropped
    );

    (kept, stats)
}
