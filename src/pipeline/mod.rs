// Data pipeline: ingestion, processing, and storage

pub mod ingestion;
pub mod orchestrator;
pub mod processing;
pub mod storage;

pub use orchestrator::{Job, Pipeline, PipelineResult, SourceLocations, Sources};
pub use processing::normalize;
