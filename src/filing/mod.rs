pub mod dedup;
pub mod reader;
pub mod relevance;
pub mod types;

pub use dedup::{dedup_queries, DedupOutcome, Deduplicator, QueryStats};
pub use reader::{read_filings, write_filings, write_json, MalformedPolicy, ReadOutcome};
pub use relevance::{classify, is_relevant, FilterStats, SubmissionTypeCount};
pub use types::*;

// Module-level constants
pub const TARGET_INGEST: &str = "ingest";
