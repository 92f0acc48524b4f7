pub mod company;
pub mod documents;
pub mod entity;
pub mod environment;
pub mod errors;
pub mod filing;
pub mod logging;
pub mod pipeline;

pub use errors::IngestError;

pub const TARGET_PIPELINE: &str = "pipeline";
