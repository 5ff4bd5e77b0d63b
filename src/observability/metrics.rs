//! Metrics for the join pipeline, recorded through the `metrics` facade.
//!
//! Nothing is exported unless [`init`] installs the Prometheus recorder; the
//! batch job then writes one text snapshot at the end of the run.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    UsersLoaded,
    EventsLoaded,
    DuplicateRows,
    MatchedRows,
    UnmatchedRows,
    DistinctUsers,
    StagesCompleted,
    DatasetsWritten,
    DatasetRowsWritten,
    PipelineDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::UsersLoaded => "join_users_loaded_total",
            MetricName::EventsLoaded => "join_events_loaded_total",
            MetricName::DuplicateRows => "join_duplicate_rows_total",
            MetricName::MatchedRows => "join_matched_rows_total",
            MetricName::UnmatchedRows => "join_unmatched_rows_total",
            MetricName::DistinctUsers => "join_distinct_users",
            MetricName::StagesCompleted => "join_stages_completed_total",
            MetricName::DatasetsWritten => "join_datasets_written_total",
            MetricName::DatasetRowsWritten => "join_dataset_rows_written_total",
            MetricName::PipelineDuration => "join_pipeline_duration_seconds",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus recorder and return a handle for rendering
pub fn init() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| PipelineError::Metrics(format!("Failed to install Prometheus recorder: {e}")))?;
    info!("Metrics recorder installed");
    Ok(handle)
}

/// Write the current metrics in Prometheus text format
pub fn write_snapshot(handle: &PrometheusHandle, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, handle.render())?;
    info!(path = %path.display(), "Metrics snapshot written");
    Ok(())
}

// ============================================================================
// Pipeline Metrics
// ============================================================================

pub mod pipeline {
    use super::MetricName;
    use crate::pipeline::Stage;

    pub fn users_loaded(count: usize) {
        ::metrics::counter!(MetricName::UsersLoaded.as_str()).increment(count as u64);
    }

    pub fn events_loaded(count: usize) {
        ::metrics::counter!(MetricName::EventsLoaded.as_str()).increment(count as u64);
    }

    pub fn stage_completed(stage: Stage, rows: usize) {
        ::metrics::counter!(MetricName::StagesCompleted.as_str(), "stage" => stage.as_str())
            .increment(1);
        match stage {
            Stage::Duplicates => {
                ::metrics::counter!(MetricName::DuplicateRows.as_str()).increment(rows as u64)
            }
            Stage::Aggregate => {
                ::metrics::gauge!(MetricName::DistinctUsers.as_str()).set(rows as f64)
            }
            _ => {}
        }
    }

    pub fn partitioned(matched: usize, unmatched: usize) {
        ::metrics::counter!(MetricName::MatchedRows.as_str()).increment(matched as u64);
        ::metrics::counter!(MetricName::UnmatchedRows.as_str()).increment(unmatched as u64);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::PipelineDuration.as_str()).record(secs);
    }
}

// ============================================================================
// Output Metrics
// ============================================================================

pub mod output {
    use super::MetricName;

    pub fn dataset_written(dataset: &str, rows: usize) {
        let dataset = dataset.to_string();
        ::metrics::counter!(MetricName::DatasetsWritten.as_str(), "dataset" => dataset.clone())
            .increment(1);
        ::metrics::counter!(MetricName::DatasetRowsWritten.as_str(), "dataset" => dataset)
            .increment(rows as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        let all = [
            MetricName::UsersLoaded,
            MetricName::EventsLoaded,
            MetricName::DuplicateRows,
            MetricName::MatchedRows,
            MetricName::UnmatchedRows,
            MetricName::DistinctUsers,
            MetricName::StagesCompleted,
            MetricName::DatasetsWritten,
            MetricName::DatasetRowsWritten,
            MetricName::PipelineDuration,
        ];
        for name in all {
            assert!(name.to_string().starts_with("join_"));
        }
    }

    #[test]
    fn test_recording_without_recorder_is_a_no_op() {
        pipeline::users_loaded(3);
        pipeline::stage_completed(crate::pipeline::Stage::Aggregate, 2);
        output::dataset_written("joined_events", 5);
    }
}
