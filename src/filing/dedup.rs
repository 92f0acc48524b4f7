//! Union of several query result sets into one set of unique filings.
//!
//! The contract is "first occurrence wins": queries are consumed in the order
//! they are added and filings within a query in their listed order. When a
//! later filing repeats an already-seen `submission_id` it is discarded, even
//! if its content differs. Output order is the order of first occurrence.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use super::types::RawFiling;
use super::TARGET_INGEST;

/// Per-query accounting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryStats {
    pub query: String,
    pub fetched: usize,
    pub new_unique: usize,
    pub missing_submission_id: usize,
}

/// Result of deduplicating all queries
#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub filings: Vec<RawFiling>,
    pub queries: Vec<QueryStats>,
    pub missing_submission_id: usize,
}

#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
    filings: Vec<RawFiling>,
    queries: Vec<QueryStats>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one query's result set. Must be called in query order.
    pub fn add_query<I>(&mut self, query: &str, filings: I) -> QueryStats
    where
        I: IntoIterator<Item = RawFiling>,
    {
        let mut stats = QueryStats {
            query: query.to_string(),
            ..Default::default()
        };

        for mut filing in filings {
            stats.fetched += 1;

            let Some(id) = filing.id().map(str::to_string) else {
                stats.missing_submission_id += 1;
                continue;
            };

            if self.seen.insert(id.clone()) {
                stats.new_unique += 1;
                // stored id is the dedup key
                filing.submission_id = Some(id);
                self.filings.push(filing);
            }
        }

        if stats.missing_submission_id > 0 {
            warn!(
                target: TARGET_INGEST,
                "Query '{}': {} filings without submission id excluded",
                query, stats.missing_submission_id
            );
        }
        info!(
            target: TARGET_INGEST,
            "Query '{}': fetched {}, {} new unique", query, stats.fetched, stats.new_unique
        );

        self.queries.push(stats.clone());
        stats
    }

    pub fn unique_count(&self) -> usize {
        self.filings.len()
    }

    pub fn finish(self) -> DedupOutcome {
        let missing_submission_id = self.queries.iter().map(|q| q.missing_submission_id).sum();
        DedupOutcome {
            filings: self.filings,
            queries: self.queries,
            missing_submission_id,
        }
    }
}

/// Deduplicate a list of `(query label, filings)` pairs in the given order.
pub fn dedup_queries<I>(queries: I) -> DedupOutcome
where
    I: IntoIterator<Item = (String, Vec<RawFiling>)>,
{
    let mut dedup = Deduplicator::new();
    for (label, filings) in queries {
        dedup.add_query(&label, filings);
    }
    dedup.finish()
}
