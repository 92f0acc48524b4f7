pub mod aliases;
pub mod normalizer;

pub use aliases::{extract_dba, is_excluded_filer};
pub use normalizer::normalize;

// Module-level constants
pub const TARGET_ENTITY: &str = "entity";
