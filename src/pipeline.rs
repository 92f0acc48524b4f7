//! Batch pipeline: extract (dedup) → filter → structure.
//!
//! Every stage reads its input from and writes its output to the data
//! directory so stages can be rerun on their own. `run` chains them in memory
//! and records run statistics.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::company::{structure_companies, AggregationStats, CompanyRecord};
use crate::documents::{download_manifest, DocumentDownload};
use crate::filing::{
    classify, read_filings, write_filings, write_json, Deduplicator, FilterStats,
    MalformedPolicy, QueryStats, RawFiling, SubmissionTypeCount,
};
use crate::TARGET_PIPELINE;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Query result files in query order; earlier files win on duplicate ids
    pub query_files: Vec<PathBuf>,
    pub data_dir: PathBuf,
    pub malformed_policy: MalformedPolicy,
}

impl PipelineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            query_files: Vec::new(),
            data_dir: data_dir.into(),
            malformed_policy: MalformedPolicy::default(),
        }
    }

    pub fn with_query_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.query_files.push(path.into());
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    pub fn raw_filings_path(&self) -> PathBuf {
        self.data_dir.join("raw").join("filings_raw.jsonl")
    }

    pub fn extraction_meta_path(&self) -> PathBuf {
        self.data_dir.join("raw").join("extraction_meta.json")
    }

    pub fn filtered_filings_path(&self) -> PathBuf {
        self.data_dir.join("processed").join("filings_filtered.jsonl")
    }

    pub fn companies_path(&self) -> PathBuf {
        self.data_dir.join("processed").join("companies.json")
    }

    pub fn run_stats_path(&self) -> PathBuf {
        self.data_dir.join("processed").join("run_stats.json")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.data_dir.join("processed").join("download_manifest.json")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMeta {
    pub generated_at: String,
    pub queries: Vec<QueryStats>,
    pub total_unique_filings: usize,
    pub missing_submission_id: usize,
    pub malformed_lines: usize,
    pub output_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureStats {
    #[serde(flatten)]
    pub aggregation: AggregationStats,
    pub unique_companies: usize,
    pub companies_with_multiple_apps: usize,
    pub total_documents: usize,
}

impl StructureStats {
    fn new(aggregation: AggregationStats, records: &[CompanyRecord]) -> Self {
        Self {
            aggregation,
            unique_companies: records.len(),
            companies_with_multiple_apps: records
                .iter()
                .filter(|r| r.application_count > 1)
                .count(),
            total_documents: records.iter().map(|r| r.documents.len()).sum(),
        }
    }
}

/// Counters for one full run. Operators compare these across runs to spot
/// silent data loss when the upstream schema drifts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub total_fetched: usize,
    pub unique_filings: usize,
    pub missing_submission_id: usize,
    pub malformed_lines: usize,
    pub relevant_filings: usize,
    pub dropped_by_classifier: usize,
    pub by_submission_type: Vec<SubmissionTypeCount>,
    #[serde(flatten)]
    pub structure: StructureStats,
}

fn load(path: &Path, policy: MalformedPolicy) -> Result<(Vec<RawFiling>, usize)> {
    let outcome = read_filings(path, policy)
        .with_context(|| format!("Failed to read filings from {}", path.display()))?;
    if outcome.malformed_lines > 0 {
        warn!(
            target: TARGET_PIPELINE,
            "{} malformed lines skipped in {}",
            outcome.malformed_lines,
            path.display()
        );
    }
    Ok((outcome.filings, outcome.malformed_lines))
}

/// Read every query file, dedup, write the raw filing set and its metadata.
pub fn extract(config: &PipelineConfig) -> Result<(Vec<RawFiling>, ExtractionMeta)> {
    if config.query_files.is_empty() {
        anyhow::bail!("No query result files given");
    }

    let mut dedup = Deduplicator::new();
    let mut malformed_lines = 0;

    for path in &config.query_files {
        let (filings, malformed) = load(path, config.malformed_policy)?;
        malformed_lines += malformed;
        dedup.add_query(&path.display().to_string(), filings);
    }

    let outcome = dedup.finish();
    let output_file = config.raw_filings_path();
    write_filings(&output_file, &outcome.filings)?;

    let meta = ExtractionMeta {
        generated_at: chrono::Utc::now().to_rfc3339(),
        queries: outcome.queries,
        total_unique_filings: outcome.filings.len(),
        missing_submission_id: outcome.missing_submission_id,
        malformed_lines,
        output_file: output_file.display().to_string(),
    };
    write_json(&config.extraction_meta_path(), &meta)?;

    info!(
        target: TARGET_PIPELINE,
        "Saved {} unique filings to {}",
        meta.total_unique_filings,
        output_file.display()
    );

    Ok((outcome.filings, meta))
}

/// Keep relevant filings and write them out.
pub fn filter(
    config: &PipelineConfig,
    filings: Vec<RawFiling>,
) -> Result<(Vec<RawFiling>, FilterStats)> {
    let (kept, stats) = classify(filings);
    write_filings(&config.filtered_filings_path(), &kept)?;
    Ok((kept, stats))
}

/// Build company records from relevant filings and write `companies.json`.
pub fn structure(
    config: &PipelineConfig,
    filings: &[RawFiling],
) -> Result<(Vec<CompanyRecord>, StructureStats)> {
    let (records, aggregation) = structure_companies(filings);
    let stats = StructureStats::new(aggregation, &records);

    let path = config.companies_path();
    write_json(&path, &records)?;
    info!(
        target: TARGET_PIPELINE,
        "Saved {} companies to {}",
        records.len(),
        path.display()
    );

    Ok((records, stats))
}

/// Filter stage on its own, reading the raw filing set from disk.
pub fn filter_from_disk(config: &PipelineConfig) -> Result<FilterStats> {
    let (filings, _) = load(&config.raw_filings_path(), config.malformed_policy)?;
    let (_, stats) = filter(config, filings)?;
    Ok(stats)
}

/// Structure stage on its own, reading the filtered filing set from disk.
pub fn structure_from_disk(config: &PipelineConfig) -> Result<StructureStats> {
    let (filings, _) = load(&config.filtered_filings_path(), config.malformed_policy)?;
    let (_, stats) = structure(config, &filings)?;
    Ok(stats)
}

/// All stages in order; writes `run_stats.json` last.
pub fn run(config: &PipelineConfig) -> Result<RunStats> {
    let (unique, meta) = extract(config)?;
    let (relevant, filter_stats) = filter(config, unique)?;
    let (_, structure_stats) = structure(config, &relevant)?;

    let stats = RunStats {
        total_fetched: meta.queries.iter().map(|q| q.fetched).sum(),
        unique_filings: meta.total_unique_filings,
        missing_submission_id: meta.missing_submission_id,
        malformed_lines: meta.malformed_lines,
        relevant_filings: filter_stats.kept,
        dropped_by_classifier: filter_stats.dropped,
        by_submission_type: filter_stats.by_submission_type,
        structure: structure_stats,
    };
    write_json(&config.run_stats_path(), &stats)?;

    Ok(stats)
}

/// Read `companies.json` and write the unique-by-URL download manifest.
pub fn manifest(config: &PipelineConfig) -> Result<Vec<DocumentDownload>> {
    let path = config.companies_path();
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let companies: Vec<CompanyRecord> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let downloads = download_manifest(&companies);
    write_json(&config.manifest_path(), &downloads)?;

    info!(
        target: TARGET_PIPELINE,
        "{} unique documents across {} companies",
        downloads.len(),
        companies.len()
    );

    Ok(downloads)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUERY_ONE: &str = r#"{"id_submission": "1", "filers": [{"name": "Acme VoIP LLC"}], "submissiontype": {"description": "APPLICATION"}, "filingstatus": {"description": "ACCEPTED"}, "date_received": "2021-03-01T00:00:00Z", "proceedings": [{"name": "WC 20-151", "description": "Interconnected VoIP Numbering request"}], "documents": [{"filename": "Application.pdf", "src": "https://www.fcc.gov/ecfs/document/1/1"}], "authors": [{"name": "Jane Roe"}], "lawfirms": []}
{"id_submission": "2", "filers": [{"name": "Wireline Competition Bureau"}], "submissiontype": {"description": "ORDER"}, "date_received": "2021-04-01", "proceedings": [{"name": "WC 20-151", "description": "Interconnected VoIP Numbering"}]}
{"id_submission": "3", "filers": [{"name": "Unrelated Co"}], "submissiontype": {"description": "COMMENT"}, "date_received": "2021-05-01", "proceedings": [{"name": "GN 09-191", "description": "Open Internet"}], "documents": [{"filename": "comments.pdf", "src": "https://www.fcc.gov/ecfs/document/3/1"}]}
"#;

    const QUERY_TWO: &str = r#"{"id_submission": "1", "filers": [{"name": "Someone Else"}], "submissiontype": {"description": "APPLICATION"}}
{"id_submission": "4", "filers": [{"name": "ACME VOIP, L.L.C."}], "submissiontype": {"description": "SUPPLEMENT"}, "date_received": "2022-01-15T00:00:00Z", "proceedings": [{"name": "INBOX-52.15", "description": "Authorization to Obtain Numbering Resources"}], "documents": [{"filename": "Supplement: Exhibit A.pdf", "src": "https://www.fcc.gov/ecfs/document/4/1"}, {"filename": "Application.pdf", "src": "https://www.fcc.gov/ecfs/document/1/1"}]}
{"filers": [{"name": "No Id Inc"}]}
{"id_submission": "5", "filers": [], "submissiontype": {"description": "APPLICATION"}, "documents": [{"filename": "VoIP Numbering Application.pdf", "src": "https://www.fcc.gov/ecfs/document/5/1"}]}
{"id_submission": "6", "filers": [{"name": "Gamma Networks LLC"}], "submissiontype": {"description": "SUPPLEMENT"}, "date_received": "2022-02-01", "proceedings": [{"name": "WC 20-151", "description": "Interconnected VoIP Numbering"}]}
"#;

    fn config_with_queries(dir: &tempfile::TempDir, queries: &[&str]) -> PipelineConfig {
        let mut config = PipelineConfig::new(dir.path().join("data"));
        for (i, body) in queries.iter().enumerate() {
            let path = dir.path().join(format!("query_{}.jsonl", i + 1));
            fs::write(&path, body).unwrap();
            config = config.with_query_file(path);
        }
        config
    }

    #[test]
    fn test_full_run_produces_expected_companies_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_queries(&dir, &[QUERY_ONE, QUERY_TWO]);

        let stats = run(&config).unwrap();

        assert_eq!(stats.total_fetched, 8);
        assert_eq!(stats.missing_submission_id, 1);
        assert_eq!(stats.unique_filings, 6);
        assert_eq!(stats.dropped_by_classifier, 1);
        assert_eq!(stats.relevant_filings, 5);
        assert_eq!(stats.by_submission_type[0].submission_type, "APPLICATION");
        assert_eq!(stats.by_submission_type[0].count, 2);
        assert_eq!(stats.structure.aggregation.excluded_govt, 1);
        assert_eq!(stats.structure.aggregation.excluded_no_filer, 1);
        assert_eq!(stats.structure.aggregation.dropped_no_application, 1);
        assert_eq!(stats.structure.unique_companies, 1);
        assert_eq!(stats.structure.total_documents, 3);

        let text = fs::read_to_string(config.companies_path()).unwrap();
        let companies: Vec<CompanyRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(companies.len(), 1);

        let acme = &companies[0];
        assert_eq!(acme.company_name_normalized, "acme voip llc");
        assert_eq!(acme.first_filing_date.as_deref(), Some("2021-03-01"));
        assert_eq!(acme.latest_filing_date.as_deref(), Some("2022-01-15"));
        assert_eq!(acme.application_count, 1);
        assert_eq!(acme.total_filing_count, 2);
        assert_eq!(acme.docket_numbers, vec!["WC 20-151"]);
        assert_eq!(acme.contacts, vec!["Jane Roe"]);

        assert!(config.raw_filings_path().exists());
        assert!(config.extraction_meta_path().exists());
        assert!(config.filtered_filings_path().exists());
        assert!(config.run_stats_path().exists());
    }

    #[test]
    fn test_run_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_queries(&dir, &[QUERY_ONE, QUERY_TWO]);

        run(&config).unwrap();
        let first = fs::read_to_string(config.companies_path()).unwrap();
        run(&config).unwrap();
        let second = fs::read_to_string(config.companies_path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_stages_can_run_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_queries(&dir, &[QUERY_ONE, QUERY_TWO]);

        let (_, meta) = extract(&config).unwrap();
        assert_eq!(meta.queries.len(), 2);
        assert_eq!(meta.queries[1].new_unique, 3);

        let filter_stats = filter_from_disk(&config).unwrap();
        assert_eq!(filter_stats.kept, 5);

        let structure_stats = structure_from_disk(&config).unwrap();
        assert_eq!(structure_stats.unique_companies, 1);

        let downloads = manifest(&config).unwrap();
        assert_eq!(downloads.len(), 2);
        assert_eq!(downloads[0].local_filename, "1_Application.pdf");
        assert_eq!(downloads[1].local_filename, "4_Supplement_Exhibit_A.pdf");
        assert!(config.manifest_path().exists());
    }

    #[test]
    fn test_malformed_line_policy() {
        let dir = tempfile::tempdir().unwrap();
        let broken = format!("{}not json at all\n", QUERY_ONE);
        let config = config_with_queries(&dir, &[broken.as_str()]);

        assert!(run(&config).is_err());

        let skipping = config.with_malformed_policy(MalformedPolicy::Skip);
        let stats = run(&skipping).unwrap();
        assert_eq!(stats.malformed_lines, 1);
        assert_eq!(stats.unique_filings, 3);
    }

    #[test]
    fn test_extract_requires_query_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::new(dir.path());
        assert!(extract(&config).is_err());
    }

    #[test]
    fn test_run_stats_serialize_flat() {
        let stats = RunStats::default();
        let json = serde_json::to_value(&stats).unwrap();
        for field in [
            "excluded_govt",
            "excluded_no_filer",
            "dropped_by_classifier",
            "unique_companies",
            "missing_submission_id",
            "missing_submission_type",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
    }
}
