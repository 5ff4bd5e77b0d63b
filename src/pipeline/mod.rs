// Batch transformation pipeline: processing stages and the in-memory runner

pub mod pipeline;
pub mod processing;

pub use pipeline::{run_pipeline, PipelineOutputs, PipelineStats, Stage};
