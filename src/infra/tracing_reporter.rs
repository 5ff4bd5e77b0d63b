use tracing::{debug, info};

use crate::app::ports::PipelineReporter;
use crate::constants;
use crate::observability::metrics;
use crate::pipeline::Stage;

/// `PipelineReporter` that logs through `tracing` and counts through `metrics`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

fn dataset_icon(dataset: &str) -> &'static str {
    match dataset {
        constants::DUPLICATE_EMAILS => "📄",
        constants::JOINED_EVENTS => "✅",
        constants::UNMATCHED_EVENT_IDS => "⚠️",
        constants::USER_EVENT_COUNTS => "📊",
        _ => "💾",
    }
}

impl PipelineReporter for TracingReporter {
    fn stage_completed(&self, stage: Stage, rows: usize) {
        debug!(stage = %stage, rows, "Stage completed");
        metrics::pipeline::stage_completed(stage, rows);
    }

    fn dataset_written(&self, dataset: &str, rows: usize, location: &str) {
        info!(dataset, rows, location, "{} {} saved", dataset_icon(dataset), dataset);
        metrics::output::dataset_written(dataset, rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_output_dataset_has_its_own_icon() {
        for dataset in constants::output_datasets() {
            assert_ne!(dataset_icon(dataset), "💾");
        }
        assert_eq!(dataset_icon("other"), "💾");
    }
}
