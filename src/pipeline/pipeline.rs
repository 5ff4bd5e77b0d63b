use serde::Serialize;
use std::fmt;
use tracing::{info, instrument};

use crate::app::ports::PipelineReporter;
use crate::domain::{EventRow, FinalRow, NormalizedUser, UnmatchedRow, UserEventCount, UserTable};
use crate::pipeline::processing::{
    count_events_per_user, find_duplicates, left_join, normalize, partition, DuplicatePolicy,
};

/// Stages of a pipeline run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Normalize,
    Duplicates,
    Join,
    Partition,
    Aggregate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Duplicates => "duplicates",
            Stage::Join => "join",
            Stage::Partition => "partition",
            Stage::Aggregate => "aggregate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row counts gathered along a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub users: usize,
    pub events: usize,
    pub duplicate_rows: usize,
    pub joined_rows: usize,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    pub distinct_users: usize,
}

/// The four derived datasets of a run
#[derive(Debug, Clone, Default)]
pub struct PipelineOutputs {
    /// Source header of the users table, used to write duplicates
    pub user_header: Vec<String>,
    pub duplicates: Vec<NormalizedUser>,
    pub joined_events: Vec<FinalRow>,
    pub unmatched: Vec<UnmatchedRow>,
    pub counts: Vec<UserEventCount>,
    pub stats: PipelineStats,
}

/// Run every stage over fully loaded tables.
#[instrument(skip_all, fields(users = users.rows.len(), events = events.len()))]
pub fn run_pipeline(
    users: UserTable,
    events: Vec<EventRow>,
    policy: DuplicatePolicy,
    reporter: &dyn PipelineReporter,
) -> PipelineOutputs {
    let UserTable { header, rows } = users;
    let mut stats = PipelineStats {
        users: rows.len(),
        events: events.len(),
        ..PipelineStats::default()
    };

    let users = normalize::normalize_users(rows);
    let events = normalize::normalize_events(events);
    reporter.stage_completed(Stage::Normalize, users.len() + events.len());

    let duplicates: Vec<NormalizedUser> = find_duplicates(&users, policy)
        .into_iter()
        .cloned()
        .collect();
    stats.duplicate_rows = duplicates.len();
    reporter.stage_completed(Stage::Duplicates, duplicates.len());

    let joined = left_join(&events, &users);
    stats.joined_rows = joined.len();
    reporter.stage_completed(Stage::Join, joined.len());

    let split = partition(&joined);
    stats.matched_rows = split.matched.len();
    stats.unmatched_rows = split.unmatched.len();
    reporter.stage_completed(Stage::Partition, joined.len());

    let counts = count_events_per_user(&split.matched);
    stats.distinct_users = counts.len();
    reporter.stage_completed(Stage::Aggregate, counts.len());

    info!(
        matched = stats.matched_rows,
        unmatched = stats.unmatched_rows,
        duplicates = stats.duplicate_rows,
        "Pipeline transformations finished"
    );

    PipelineOutputs {
        user_header: header,
        duplicates,
        joined_events: split.matched,
        unmatched: split.unmatched,
        counts,
        stats,
    }
}
