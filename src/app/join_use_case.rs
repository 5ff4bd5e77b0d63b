use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::app::ports::{DatasetSink, PipelineReporter, TableSource};
use crate::constants;
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::processing::{find_duplicates, normalize, DuplicatePolicy};
use crate::pipeline::{run_pipeline, PipelineOutputs, PipelineStats, Stage};

/// One dataset written by a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetReport {
    pub dataset: String,
    pub rows: usize,
    pub location: String,
}

/// Result of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stats: PipelineStats,
    pub datasets: Vec<DatasetReport>,
}

/// Use case that loads both tables, runs the pipeline and writes every
/// derived dataset. Stops at the first error.
pub struct JoinUseCase {
    source: Box<dyn TableSource>,
    sink: Box<dyn DatasetSink>,
    reporter: Arc<dyn PipelineReporter>,
    policy: DuplicatePolicy,
}

impl JoinUseCase {
    pub fn new(
        source: Box<dyn TableSource>,
        sink: Box<dyn DatasetSink>,
        reporter: Arc<dyn PipelineReporter>,
    ) -> Self {
        Self {
            source,
            sink,
            reporter,
            policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full pipeline and write all four datasets
    #[instrument(skip(self), fields(run_id = tracing::field::Empty))]
    pub fn execute(&self) -> Result<PipelineSummary> {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        let started_at = Utc::now();
        let timer = std::time::Instant::now();
        info!("Starting join pipeline run");

        // Both tables load before anything is written
        let users = self.source.load_users().inspect_err(|e| error!("Failed to load users: {}", e))?;
        let events = self.source.load_events().inspect_err(|e| error!("Failed to load events: {}", e))?;
        metrics::pipeline::users_loaded(users.rows.len());
        metrics::pipeline::events_loaded(events.len());

        let outputs = run_pipeline(users, events, self.policy, self.reporter.as_ref());
        metrics::pipeline::partitioned(outputs.stats.matched_rows, outputs.stats.unmatched_rows);

        let datasets = self.write_outputs(&outputs)?;

        metrics::pipeline::duration(timer.elapsed().as_secs_f64());
        let summary = PipelineSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            stats: outputs.stats,
            datasets,
        };
        info!(
            datasets = summary.datasets.len(),
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "Join pipeline run completed"
        );
        Ok(summary)
    }

    /// Load users only and write the duplicate_emails dataset
    #[instrument(skip(self))]
    pub fn execute_duplicates(&self) -> Result<DatasetReport> {
        let users = self.source.load_users()?;
        metrics::pipeline::users_loaded(users.rows.len());

        let normalized = normalize::normalize_users(users.rows);
        self.reporter.stage_completed(Stage::Normalize, normalized.len());

        let duplicates: Vec<_> = find_duplicates(&normalized, self.policy)
            .into_iter()
            .cloned()
            .collect();
        self.reporter.stage_completed(Stage::Duplicates, duplicates.len());

        let location = self.sink.write_duplicates(&users.header, &duplicates)?;
        Ok(self.written(constants::DUPLICATE_EMAILS, duplicates.len(), location))
    }

    fn write_outputs(&self, outputs: &PipelineOutputs) -> Result<Vec<DatasetReport>> {
        let mut reports = Vec::with_capacity(4);

        let location = self
            .sink
            .write_duplicates(&outputs.user_header, &outputs.duplicates)?;
        reports.push(self.written(constants::DUPLICATE_EMAILS, outputs.duplicates.len(), location));

        let location = self.sink.write_joined_events(&outputs.joined_events)?;
        reports.push(self.written(constants::JOINED_EVENTS, outputs.joined_events.len(), location));

        let location = self.sink.write_unmatched(&outputs.unmatched)?;
        reports.push(self.written(constants::UNMATCHED_EVENT_IDS, outputs.unmatched.len(), location));

        let location = self.sink.write_counts(&outputs.counts)?;
        reports.push(self.written(constants::USER_EVENT_COUNTS, outputs.counts.len(), location));

        Ok(reports)
    }

    fn written(&self, dataset: &str, rows: usize, location: String) -> DatasetReport {
        self.reporter.dataset_written(dataset, rows, &location);
        DatasetReport {
            dataset: dataset.to_string(),
            rows,
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        EventRow, FinalRow, NormalizedUser, UnmatchedRow, UserEventCount, UserId, UserRow, UserTable,
    };
    use crate::error::PipelineError;
    use std::sync::Mutex;

    struct StaticSource {
        users: Option<UserTable>,
        events: Vec<EventRow>,
    }

    impl TableSource for StaticSource {
        fn load_users(&self) -> Result<UserTable> {
            self.users.clone().ok_or(PipelineError::MissingColumn {
                table: constants::USERS_TABLE,
                column: constants::EMAIL,
            })
        }

        fn load_events(&self) -> Result<Vec<EventRow>> {
            Ok(self.events.clone())
        }
    }

    #[derive(Default)]
    struct MockSink {
        written: Arc<Mutex<Vec<String>>>,
        fail_on: Option<&'static str>,
    }

    impl MockSink {
        fn record(&self, dataset: &'static str) -> Result<String> {
            if self.fail_on == Some(dataset) {
                return Err(PipelineError::Io(std::io::Error::other("disk full")));
            }
            self.written.lock().unwrap().push(dataset.to_string());
            Ok(format!("mem://{dataset}"))
        }
    }

    impl DatasetSink for MockSink {
        fn write_duplicates(&self, _header: &[String], _rows: &[NormalizedUser]) -> Result<String> {
            self.record(constants::DUPLICATE_EMAILS)
        }
        fn write_joined_events(&self, _rows: &[FinalRow]) -> Result<String> {
            self.record(constants::JOINED_EVENTS)
        }
        fn write_unmatched(&self, _rows: &[UnmatchedRow]) -> Result<String> {
            self.record(constants::UNMATCHED_EVENT_IDS)
        }
        fn write_counts(&self, _rows: &[UserEventCount]) -> Result<String> {
            self.record(constants::USER_EVENT_COUNTS)
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        datasets: Mutex<Vec<(String, usize)>>,
    }

    impl PipelineReporter for RecordingReporter {
        fn stage_completed(&self, _stage: Stage, _rows: usize) {}

        fn dataset_written(&self, dataset: &str, rows: usize, _location: &str) {
            self.datasets.lock().unwrap().push((dataset.to_string(), rows));
        }
    }

    fn users() -> UserTable {
        UserTable {
            header: vec!["user_id".into(), "name".into(), "email".into(), "signup_date".into()],
            rows: vec![UserRow {
                user_id: Some(UserId::new("1")),
                name: Some("Dr. Jane Public".to_string()),
                email: Some("Jane@Test.com".to_string()),
                signup_date: "2024-01-01".to_string(),
                source_fields: vec![
                    "1".into(),
                    "Dr. Jane Public".into(),
                    "Jane@Test.com".into(),
                    "2024-01-01".into(),
                ],
            }],
        }
    }

    fn events() -> Vec<EventRow> {
        ["jane@test.com", "nobody@test.com"]
            .iter()
            .enumerate()
            .map(|(i, email)| EventRow {
                event_id: format!("e{}", i + 1),
                user_email: Some(email.to_string()),
                event_type: "login".to_string(),
                timestamp: "2024-02-01T10:00:00".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_execute_writes_all_datasets_in_order() {
        let sink = MockSink::default();
        let written = sink.written.clone();
        let reporter = Arc::new(RecordingReporter::default());
        let use_case = JoinUseCase::new(
            Box::new(StaticSource { users: Some(users()), events: events() }),
            Box::new(sink),
            reporter.clone(),
        );

        let summary = use_case.execute().unwrap();

        assert_eq!(*written.lock().unwrap(), constants::output_datasets());
        assert_eq!(summary.stats.matched_rows, 1);
        assert_eq!(summary.stats.unmatched_rows, 1);
        assert_eq!(
            *reporter.datasets.lock().unwrap(),
            vec![
                (constants::DUPLICATE_EMAILS.to_string(), 0),
                (constants::JOINED_EVENTS.to_string(), 1),
                (constants::UNMATCHED_EVENT_IDS.to_string(), 1),
                (constants::USER_EVENT_COUNTS.to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_load_failure_writes_nothing() {
        let sink = MockSink::default();
        let written = sink.written.clone();
        let use_case = JoinUseCase::new(
            Box::new(StaticSource { users: None, events: events() }),
            Box::new(sink),
            Arc::new(RecordingReporter::default()),
        );

        let result = use_case.execute();

        assert!(matches!(result, Err(PipelineError::MissingColumn { .. })));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_write_failure_stops_the_run() {
        let sink = MockSink {
            fail_on: Some(constants::UNMATCHED_EVENT_IDS),
            ..MockSink::default()
        };
        let written = sink.written.clone();
        let use_case = JoinUseCase::new(
            Box::new(StaticSource { users: Some(users()), events: events() }),
            Box::new(sink),
            Arc::new(RecordingReporter::default()),
        );

        assert!(use_case.execute().is_err());
        assert_eq!(
            *written.lock().unwrap(),
            vec![constants::DUPLICATE_EMAILS.to_string(), constants::JOINED_EVENTS.to_string()]
        );
    }

    #[test]
    fn test_execute_duplicates_only_writes_duplicates() {
        let mut table = users();
        let mut twin = table.rows[0].clone();
        twin.user_id = Some(UserId::new("2"));
        twin.email = Some(" JANE@test.com".to_string());
        table.rows.push(twin);

        let sink = MockSink::default();
        let written = sink.written.clone();
        let use_case = JoinUseCase::new(
            Box::new(StaticSource { users: Some(table), events: vec![] }),
            Box::new(sink),
            Arc::new(RecordingReporter::default()),
        );

        let report = use_case.execute_duplicates().unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(*written.lock().unwrap(), vec![constants::DUPLICATE_EMAILS.to_string()]);
    }
}
