//! Newline-delimited JSON input and output for filing artifacts.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

use super::types::RawFiling;
use super::TARGET_INGEST;
use crate::errors::IngestError;

/// What to do with a line that is not a valid filing object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Fail the whole read on the first malformed line
    #[default]
    Abort,
    /// Log and count the line, keep reading
    Skip,
}

/// Filings read from one file plus the count of skipped lines
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub filings: Vec<RawFiling>,
    pub malformed_lines: usize,
}

/// Parse a single JSONL line. `line` is 1-based and only used for reporting.
pub fn parse_filing_line(path: &Path, line: usize, text: &str) -> Result<RawFiling, IngestError> {
    serde_json::from_str(text).map_err(|source| IngestError::MalformedLine {
        path: path.to_path_buf(),
        line,
        source,
    })
}

/// Read every filing from a JSONL file, preserving file order.
pub fn read_filings(path: &Path, policy: MalformedPolicy) -> Result<ReadOutcome, IngestError> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let reader = BufReader::new(file);
    let mut outcome = ReadOutcome::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| IngestError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_filing_line(path, index + 1, &line) {
            Ok(filing) => outcome.filings.push(filing),
            Err(err) if policy == MalformedPolicy::Skip => {
                warn!(target: TARGET_INGEST, "Skipping {}", err);
                outcome.malformed_lines += 1;
            }
            Err(err) => return Err(err),
        }
    }

    debug!(
        target: TARGET_INGEST,
        "Read {} filings from {} ({} malformed)",
        outcome.filings.len(),
        path.display(),
        outcome.malformed_lines
    );

    Ok(outcome)
}

fn create_file(path: &Path) -> Result<BufWriter<File>, IngestError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| IngestError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| IngestError::io(path, e))?;
    Ok(BufWriter::new(file))
}

/// Write filings one JSON object per line.
pub fn write_filings(path: &Path, filings: &[RawFiling]) -> Result<(), IngestError> {
    let mut writer = create_file(path)?;
    for filing in filings {
        serde_json::to_writer(&mut writer, filing).map_err(|source| IngestError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        writer
            .write_all(b"\n")
            .map_err(|e| IngestError::io(path, e))?;
    }
    writer.flush().map_err(|e| IngestError::io(path, e))
}

/// Write any serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), IngestError> {
    let mut writer = create_file(path)?;
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| IngestError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    writer
        .write_all(b"\n")
        .map_err(|e| IngestError::io(path, e))?;
    writer.flush().map_err(|e| IngestError::io(path, e))
}
