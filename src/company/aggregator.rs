//! Grouping of relevant filings into company identities.
//!
//! A [`CompanyAggregator`] is built fresh for every run and owns all grouping
//! state. Filings are borrowed from the run's filing store; a filing lands in
//! at most one group. Canonical names are elected only in [`CompanyAggregator::finish`],
//! once every variant of a key has been seen.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use super::TARGET_COMPANY;
use crate::entity::{extract_dba, is_excluded_filer, normalize};
use crate::filing::RawFiling;

/// What happened to a filing offered to the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilerDisposition {
    /// Added to the group with this key
    Grouped(String),
    /// Filed by a government body
    ExcludedGovernment,
    /// No filers, or the first filer has a blank name
    NoFiler,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub total_filings: usize,
    pub excluded_govt: usize,
    pub excluded_no_filer: usize,
    /// Grouped anyway, never counted as an application
    pub missing_submission_type: usize,
    /// Groups discarded because none of their filings is an APPLICATION
    pub dropped_no_application: usize,
}

/// All filings sharing one equivalence key
#[derive(Debug, Clone)]
pub struct CompanyGroup<'a> {
    pub key: String,
    /// In the order they were added
    pub filings: Vec<&'a RawFiling>,
    pub variations: BTreeSet<String>,
}

/// A retained group with its elected canonical name
#[derive(Debug, Clone)]
pub struct ElectedCompany<'a> {
    pub key: String,
    pub company_name: String,
    pub dba_name: Option<String>,
    /// Sorted ascending
    pub variations: Vec<String>,
    pub filings: Vec<&'a RawFiling>,
    pub applications: Vec<&'a RawFiling>,
    pub other_filings: Vec<&'a RawFiling>,
}

/// Longest variant wins; equal lengths fall back to ascending string order.
fn election_order(a: &str, b: &str) -> Ordering {
    b.chars()
        .count()
        .cmp(&a.chars().count())
        .then_with(|| a.cmp(b))
}

/// Pick the display name for a set of variants.
pub fn elect_canonical_name<'s, I>(variations: I) -> Option<&'s str>
where
    I: IntoIterator<Item = &'s str>,
{
    let mut ordered: Vec<&str> = variations.into_iter().collect();
    ordered.sort_by(|a, b| election_order(a, b));
    ordered.first().copied()
}

impl<'a> CompanyGroup<'a> {
    /// Split applications from other filings and elect the canonical name.
    /// Returns `None` for groups without an application.
    pub fn elect(self) -> Option<ElectedCompany<'a>> {
        let (applications, other_filings): (Vec<&RawFiling>, Vec<&RawFiling>) =
            self.filings.iter().partition(|f| f.is_application());

        if applications.is_empty() {
            debug!(
                target: TARGET_COMPANY,
                "Dropping '{}': {} filings, none an application",
                self.key,
                self.filings.len()
            );
            return None;
        }

        let company_name = elect_canonical_name(self.variations.iter().map(String::as_str))
            .unwrap_or(self.key.as_str())
            .to_string();
        let (_, dba_name) = extract_dba(&company_name);

        Some(ElectedCompany {
            key: self.key,
            company_name,
            dba_name,
            variations: self.variations.into_iter().collect(),
            filings: self.filings,
            applications,
            other_filings,
        })
    }
}

#[derive(Debug, Default)]
pub struct CompanyAggregator<'a> {
    groups: BTreeMap<String, Vec<&'a RawFiling>>,
    variations: BTreeMap<String, BTreeSet<String>>,
    stats: AggregationStats,
}

impl<'a> CompanyAggregator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one filing. Its first filer decides which group it joins.
    pub fn add(&mut self, filing: &'a RawFiling) -> FilerDisposition {
        self.stats.total_filings += 1;

        let Some(filer_name) = filing.primary_filer() else {
            self.stats.excluded_no_filer += 1;
            return FilerDisposition::NoFiler;
        };

        if is_excluded_filer(filer_name) {
            debug!(
                target: TARGET_COMPANY,
                "Excluding government filer '{}'", filer_name
            );
            self.stats.excluded_govt += 1;
            return FilerDisposition::ExcludedGovernment;
        }

        if filing.submission_type().is_none() {
            warn!(
                target: TARGET_COMPANY,
                "Filing {} from '{}' has no submission type",
                filing.id().unwrap_or("<no id>"),
                filer_name
            );
            self.stats.missing_submission_type += 1;
        }

        let key = normalize(filer_name);
        self.variations
            .entry(key.clone())
            .or_default()
            .insert(filer_name.to_string());
        self.groups.entry(key.clone()).or_default().push(filing);

        FilerDisposition::Grouped(key)
    }

    pub fn extend<I>(&mut self, filings: I)
    where
        I: IntoIterator<Item = &'a RawFiling>,
    {
        for filing in filings {
            self.add(filing);
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn stats(&self) -> &AggregationStats {
        &self.stats
    }

    /// All groups ordered by key, before any election or dropping.
    pub fn into_groups(self) -> (Vec<CompanyGroup<'a>>, AggregationStats) {
        let mut variations = self.variations;
        let groups = self
            .groups
            .into_iter()
            .map(|(key, filings)| {
                let names = variations.remove(&key).unwrap_or_default();
                CompanyGroup {
                    key,
                    filings,
                    variations: names,
                }
            })
            .collect();
        (groups, self.stats)
    }

    /// Elect every group, dropping those without an application.
    pub fn finish(self) -> (Vec<ElectedCompany<'a>>, AggregationStats) {
        let (groups, mut stats) = self.into_groups();
        let group_count = groups.len();

        let elected: Vec<ElectedCompany<'a>> =
            groups.into_iter().filter_map(CompanyGroup::elect).collect();
        stats.dropped_no_application = group_count - elected.len();

        info!(
            target: TARGET_COMPANY,
            "Grouped {} filings into {} identities, {} with an application",
            stats.total_filings,
            group_count,
            elected.len()
        );

        (elected, stats)
    }
}
