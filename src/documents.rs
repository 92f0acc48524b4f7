//! Document naming contract shared with the download, text extraction and
//! enrichment tools.
//!
//! Downloaded files are stored as `{filing_id}_{sanitize_filename(filename)}`
//! and every tool re-locates them by recomputing that name, so these
//! functions must stay bit-identical for all callers.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use crate::company::CompanyRecord;

/// Longest sanitized filename kept without truncation
pub const MAX_FILENAME_CHARS: usize = 100;
/// Stem length kept when a filename is truncated
pub const TRUNCATED_STEM_CHARS: usize = 95;

const VIEWER_PATH: &str = "/ecfs/document/";
const DOWNLOAD_PATH: &str = "/ecfs/documents/";

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[<>:"/\\|?*]"#).unwrap();
    static ref SEPARATOR_RUNS: Regex = Regex::new(r"[_\s]+").unwrap();
}

/// Turn an ECFS viewer URL into its direct download URL.
pub fn transform_url(viewer_url: &str) -> String {
    viewer_url.replace(VIEWER_PATH, DOWNLOAD_PATH)
}

/// Make a document filename safe to store on disk.
///
/// Filesystem-unsafe characters become `_`, runs of underscores and
/// whitespace collapse to one `_`, and names over 100 characters keep the
/// first 95 characters of the stem plus the extension after the last `.`.
pub fn sanitize_filename(filename: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(filename, "_");
    let collapsed = SEPARATOR_RUNS.replace_all(&replaced, "_").into_owned();

    if collapsed.chars().count() <= MAX_FILENAME_CHARS {
        return collapsed;
    }

    let (stem, ext) = collapsed
        .rsplit_once('.')
        .unwrap_or((collapsed.as_str(), ""));
    let mut truncated: String = stem.chars().take(TRUNCATED_STEM_CHARS).collect();
    if !ext.is_empty() {
        truncated.push('.');
        truncated.push_str(ext);
    }
    truncated
}

/// Local file name of a downloaded document.
pub fn local_document_name(filing_id: &str, filename: &str) -> String {
    format!("{}_{}", filing_id, sanitize_filename(filename))
}

/// One document to fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentDownload {
    pub filing_id: String,
    pub filename: String,
    pub url: String,
    pub download_url: String,
    pub local_filename: String,
}

/// Every distinct document URL across all companies, first occurrence wins.
/// Documents with an empty URL cannot be fetched and are left out.
pub fn download_manifest(companies: &[CompanyRecord]) -> Vec<DocumentDownload> {
    let mut seen = HashSet::new();

    companies
        .iter()
        .flat_map(|company| company.documents.iter())
        .filter(|doc| !doc.url.is_empty())
        .filter(|doc| seen.insert(doc.url.clone()))
        .map(|doc| DocumentDownload {
            filing_id: doc.filing_id.clone(),
            filename: doc.filename.clone(),
            url: doc.url.clone(),
            download_url: transform_url(&doc.url),
            local_filename: local_document_name(&doc.filing_id, &doc.filename),
        })
        .collect()
}
