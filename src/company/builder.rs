//! Assembly of exported company records from elected groups.

use std::collections::BTreeSet;
use tracing::info;

use super::aggregator::{AggregationStats, CompanyAggregator, ElectedCompany};
use super::types::{CompanyRecord, DocumentEntry, FilingSummary};
use super::TARGET_COMPANY;
use crate::filing::RawFiling;

/// Intake dockets that collect unrelated submissions; never real dockets.
pub const PLACEHOLDER_DOCKETS: &[&str] = &["INBOX-52.15", "INBOX-1.41"];

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn sorted_set<'f, I>(values: I) -> Vec<String>
where
    I: Iterator<Item = &'f str>,
{
    values
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn dated<'a>(filings: &'a [&'a RawFiling]) -> impl Iterator<Item = String> + 'a {
    filings
        .iter()
        .map(|f| f.date())
        .filter(|date| !date.is_empty())
}

/// Build the record for one elected group.
pub fn build_record(company: &ElectedCompany<'_>) -> CompanyRecord {
    let filings = &company.filings;

    let docket_numbers = sorted_set(
        filings
            .iter()
            .flat_map(|f| f.proceedings.iter())
            .filter_map(|p| non_blank(p.name.as_deref()))
            .filter(|docket| !PLACEHOLDER_DOCKETS.contains(docket)),
    );

    let documents = filings
        .iter()
        .flat_map(|f| {
            f.documents.iter().map(move |doc| DocumentEntry {
                filename: doc.filename.clone().unwrap_or_default(),
                url: doc.src.clone().unwrap_or_default(),
                filing_id: f.id().unwrap_or_default().to_string(),
                filing_type: f.submission_type().map(str::to_string),
                filing_date: f.date(),
            })
        })
        .collect();

    let contacts = sorted_set(
        filings
            .iter()
            .flat_map(|f| f.authors.iter())
            .filter_map(|a| a.trimmed_name()),
    );

    let attorneys = sorted_set(
        filings
            .iter()
            .flat_map(|f| f.lawfirms.iter())
            .filter_map(|l| l.trimmed_name()),
    );

    let proceeding_types = sorted_set(
        filings
            .iter()
            .flat_map(|f| f.proceedings.iter())
            .filter_map(|p| non_blank(p.description.as_deref())),
    );

    let mut history: Vec<FilingSummary> = filings
        .iter()
        .map(|f| FilingSummary {
            id: f.id().unwrap_or_default().to_string(),
            filing_type: f.submission_type().map(str::to_string),
            date: f.date(),
            status: f.filing_status().map(str::to_string),
        })
        .collect();
    // stable: same-day filings keep input order
    history.sort_by(|a, b| a.date.cmp(&b.date));

    CompanyRecord {
        company_name: company.company_name.clone(),
        company_name_normalized: company.key.clone(),
        dba_name: company.dba_name.clone(),
        name_variations: company.variations.clone(),
        docket_numbers,
        first_filing_date: dated(&company.applications).min(),
        latest_filing_date: dated(filings).max(),
        application_count: company.applications.len(),
        total_filing_count: filings.len(),
        filings: history,
        documents,
        contacts,
        attorneys,
        proceeding_types,
    }
}

/// Group relevant filings and build one record per company, sorted by key.
pub fn structure_companies(filings: &[RawFiling]) -> (Vec<CompanyRecord>, AggregationStats) {
    let mut aggregator = CompanyAggregator::new();
    aggregator.extend(filings);
    let (elected, stats) = aggregator.finish();

    let mut records: Vec<CompanyRecord> = elected.iter().map(build_record).collect();
    records.sort_by(|a, b| a.company_name_normalized.cmp(&b.company_name_normalized));

    info!(
        target: TARGET_COMPANY,
        "Built {} company records ({} government, {} without filer excluded)",
        records.len(),
        stats.excluded_govt,
        stats.excluded_no_filer
    );

    (records, stats)
}
