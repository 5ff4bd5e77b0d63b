use crate::domain::{EventRow, FinalRow, NormalizedUser, UnmatchedRow, UserEventCount, UserTable};
use crate::error::Result;
use crate::pipeline::Stage;

/// Where the users and events tables come from
pub trait TableSource: Send + Sync {
    fn load_users(&self) -> Result<UserTable>;
    fn load_events(&self) -> Result<Vec<EventRow>>;
}

/// Where the derived datasets go. Each write returns a human-readable
/// location for the written dataset.
pub trait DatasetSink: Send + Sync {
    fn write_duplicates(&self, header: &[String], rows: &[NormalizedUser]) -> Result<String>;
    fn write_joined_events(&self, rows: &[FinalRow]) -> Result<String>;
    fn write_unmatched(&self, rows: &[UnmatchedRow]) -> Result<String>;
    fn write_counts(&self, rows: &[UserEventCount]) -> Result<String>;
}

/// Diagnostics collaborator handed to the pipeline instead of global state
pub trait PipelineReporter: Send + Sync {
    fn stage_completed(&self, stage: Stage, rows: usize);
    fn dataset_written(&self, dataset: &str, rows: usize, location: &str);
}
