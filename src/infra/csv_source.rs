use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::app::ports::TableSource;
use crate::constants::{
    EMAIL, EVENTS_TABLE, EVENT_ID, EVENT_TYPE, NAME, SIGNUP_DATE, TIMESTAMP, USERS_TABLE,
    USER_EMAIL, USER_ID,
};
use crate::domain::{EventRow, UserId, UserRow, UserTable};
use crate::error::{PipelineError, Result};

/// Reads the users and events tables from delimited text files.
/// Both files need a header row; unknown columns are ignored.
pub struct CsvTableSource {
    users_path: PathBuf,
    events_path: PathBuf,
    delimiter: u8,
}

impl CsvTableSource {
    pub fn new(users_path: impl Into<PathBuf>, events_path: impl Into<PathBuf>) -> Self {
        Self {
            users_path: users_path.into(),
            events_path: events_path.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn open(&self, table: &'static str, path: &Path) -> Result<Reader<File>> {
        if !path.is_file() {
            return Err(PipelineError::MissingInput {
                table,
                path: path.to_path_buf(),
            });
        }
        let reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(path)?;
        Ok(reader)
    }
}

/// Column positions resolved once from the header row
struct Columns {
    table: &'static str,
    header: StringRecord,
}

impl Columns {
    fn new(table: &'static str, header: StringRecord) -> Self {
        Self { table, header }
    }

    fn require(&self, column: &'static str) -> Result<usize> {
        self.header
            .iter()
            .position(|name| name == column)
            .ok_or(PipelineError::MissingColumn {
                table: self.table,
                column,
            })
    }
}

/// Line number of a record for error messages, header being line 1
fn line_of(record: &StringRecord, index: usize) -> u64 {
    record
        .position()
        .map(|pos| pos.line())
        .unwrap_or(index as u64 + 2)
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or_default()
}

/// Empty cells are absent values
fn optional_cell(record: &StringRecord, idx: usize) -> Option<String> {
    let value = cell(record, idx);
    (!value.is_empty()).then(|| value.to_string())
}

/// Blank ids carry no identity
fn optional_user_id(record: &StringRecord, idx: usize) -> Option<UserId> {
    let value = cell(record, idx);
    (!value.trim().is_empty()).then(|| UserId::new(value))
}

fn required_cell(
    record: &StringRecord,
    idx: usize,
    table: &'static str,
    column: &'static str,
    index: usize,
) -> Result<String> {
    let value = cell(record, idx);
    if value.trim().is_empty() {
        return Err(PipelineError::MissingValue {
            table,
            column,
            line: line_of(record, index),
        });
    }
    Ok(value.to_string())
}

impl TableSource for CsvTableSource {
    fn load_users(&self) -> Result<UserTable> {
        let mut reader = self.open(USERS_TABLE, &self.users_path)?;
        let columns = Columns::new(USERS_TABLE, reader.headers()?.clone());
        let user_id = columns.require(USER_ID)?;
        let name = columns.require(NAME)?;
        let email = columns.require(EMAIL)?;
        let signup_date = columns.require(SIGNUP_DATE)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(UserRow {
                user_id: optional_user_id(&record, user_id),
                name: optional_cell(&record, name),
                email: optional_cell(&record, email),
                signup_date: cell(&record, signup_date).to_string(),
                source_fields: record.iter().map(str::to_string).collect(),
            });
        }

        info!(path = %self.users_path.display(), rows = rows.len(), "Loaded users table");
        Ok(UserTable {
            header: columns.header.iter().map(str::to_string).collect(),
            rows,
        })
    }

    fn load_events(&self) -> Result<Vec<EventRow>> {
        let mut reader = self.open(EVENTS_TABLE, &self.events_path)?;
        let columns = Columns::new(EVENTS_TABLE, reader.headers()?.clone());
        let event_id = columns.require(EVENT_ID)?;
        let user_email = columns.require(USER_EMAIL)?;
        let event_type = columns.require(EVENT_TYPE)?;
        let timestamp = columns.require(TIMESTAMP)?;
        debug!(columns = columns.header.len(), "Resolved events columns");

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            rows.push(EventRow {
                event_id: required_cell(&record, event_id, EVENTS_TABLE, EVENT_ID, index)?,
                user_email: optional_cell(&record, user_email),
                event_type: cell(&record, event_type).to_string(),
                timestamp: cell(&record, timestamp).to_string(),
            });
        }

        info!(path = %self.events_path.display(), rows = rows.len(), "Loaded events table");
        Ok(rows)
    }
}
