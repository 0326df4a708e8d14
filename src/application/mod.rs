pub mod features;
pub mod ingest;
pub mod ml;
