pub mod aggregator;
pub mod builder;
pub mod types;

pub use aggregator::{
    elect_canonical_name, AggregationStats, CompanyAggregator, CompanyGroup, ElectedCompany,
    FilerDisposition,
};
pub use builder::{build_record, structure_companies};
pub use types::*;

// Module-level constants
pub const TARGET_COMPANY: &str = "company";
