use serde::{Deserialize, Serialize};

/// One document attached to one of the company's filings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub filename: String,
    /// ECFS viewer URL
    pub url: String,
    pub filing_id: String,
    pub filing_type: Option<String>,
    pub filing_date: String,
}

/// Condensed view of a filing in a company's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub filing_type: Option<String>,
    pub date: String,
    pub status: Option<String>,
}

/// Canonical company record, the unit of identity for downstream tools.
///
/// Field names are part of the `companies.json` contract; the document
/// downloader and the enrichment tools read `company_name`,
/// `company_name_normalized` and `documents[].{filing_id,filename,url}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    // Elected display name, verbatim as filed
    pub company_name: String,

    // Equivalence key; unique across the output
    pub company_name_normalized: String,

    pub dba_name: Option<String>,

    // Every raw spelling seen for this key, sorted
    pub name_variations: Vec<String>,

    pub docket_numbers: Vec<String>,

    // Earliest APPLICATION date
    pub first_filing_date: Option<String>,

    // Latest date of any filing
    pub latest_filing_date: Option<String>,

    pub application_count: usize,
    pub total_filing_count: usize,

    // Filing history, ascending by date
    pub filings: Vec<FilingSummary>,

    pub documents: Vec<DocumentEntry>,
    pub contacts: Vec<String>,
    pub attorneys: Vec<String>,
    pub proceeding_types: Vec<String>,
}
