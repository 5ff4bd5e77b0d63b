use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::debug;

use crate::app::ports::DatasetSink;
use crate::constants::{
    self, EMAIL_CLEAN, EVENT_COUNT, EVENT_ID, EVENT_TYPE, FIRST_NAME, LAST_NAME, SIGNUP_DATE,
    TIMESTAMP, USER_ID,
};
use crate::domain::{FinalRow, NormalizedUser, UnmatchedRow, UserEventCount};
use crate::error::Result;

/// Writes each dataset to `<output_dir>/<dataset>.csv`, replacing any
/// previous file. A header row is written even for empty datasets.
pub struct CsvDatasetSink {
    output_dir: PathBuf,
    delimiter: u8,
}

impl CsvDatasetSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn dataset_path(&self, dataset: &str) -> PathBuf {
        self.output_dir.join(constants::dataset_file_name(dataset))
    }

    fn create(&self, dataset: &str) -> Result<(Writer<File>, PathBuf)> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.dataset_path(dataset);
        let writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_path(&path)?;
        Ok((writer, path))
    }

    fn write_serialized<T: Serialize>(
        &self,
        dataset: &str,
        header: &[&str],
        rows: &[T],
    ) -> Result<String> {
        let (mut writer, path) = self.create(dataset)?;
        writer.write_record(header)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!(dataset, rows = rows.len(), path = %path.display(), "Dataset written");
        Ok(path.display().to_string())
    }
}

impl DatasetSink for CsvDatasetSink {
    fn write_duplicates(&self, header: &[String], rows: &[NormalizedUser]) -> Result<String> {
        let (mut writer, path) = self.create(constants::DUPLICATE_EMAILS)?;
        writer.write_record(
            header
                .iter()
                .map(String::as_str)
                .chain([EMAIL_CLEAN, FIRST_NAME, LAST_NAME]),
        )?;
        for user in rows {
            writer.write_record(user.row.source_fields.iter().map(String::as_str).chain([
                user.email_clean.as_deref().unwrap_or_default(),
                user.first_name.as_str(),
                user.last_name.as_str(),
            ]))?;
        }
        writer.flush()?;
        debug!(rows = rows.len(), path = %path.display(), "Duplicate users written");
        Ok(path.display().to_string())
    }

    fn write_joined_events(&self, rows: &[FinalRow]) -> Result<String> {
        self.write_serialized(
            constants::JOINED_EVENTS,
            &[USER_ID, FIRST_NAME, LAST_NAME, EVENT_TYPE, TIMESTAMP, SIGNUP_DATE],
            rows,
        )
    }

    fn write_unmatched(&self, rows: &[UnmatchedRow]) -> Result<String> {
        self.write_serialized(constants::UNMATCHED_EVENT_IDS, &[EVENT_ID], rows)
    }

    fn write_counts(&self, rows: &[UserEventCount]) -> Result<String> {
        self.write_serialized(constants::USER_EVENT_COUNTS, &[USER_ID, EVENT_COUNT], rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserId, UserRow};
    use tempfile::tempdir;

    #[test]
    fn test_empty_datasets_still_get_headers() {
        let dir = tempdir().unwrap();
        let sink = CsvDatasetSink::new(dir.path().join("out"));

        sink.write_unmatched(&[]).unwrap();
        sink.write_counts(&[]).unwrap();

        let unmatched = fs::read_to_string(sink.dataset_path(constants::UNMATCHED_EVENT_IDS)).unwrap();
        let counts = fs::read_to_string(sink.dataset_path(constants::USER_EVENT_COUNTS)).unwrap();
        assert_eq!(unmatched, "event_id\n");
        assert_eq!(counts, "user_id,event_count\n");
    }

    #[test]
    fn test_joined_events_column_order() {
        let dir = tempdir().unwrap();
        let sink = CsvDatasetSink::new(dir.path());
        let rows = vec![FinalRow {
            user_id: UserId::new("1"),
            first_name: "Jane".to_string(),
            last_name: "Public".to_string(),
            event_type: "login".to_string(),
            timestamp: "2024-02-01T10:00:00".to_string(),
            signup_date: "2024-01-01".to_string(),
        }];

        sink.write_joined_events(&rows).unwrap();

        let written = fs::read_to_string(sink.dataset_path(constants::JOINED_EVENTS)).unwrap();
        assert_eq!(
            written,
            "user_id,first_name,last_name,event_type,timestamp,signup_date\n\
             1,Jane,Public,login,2024-02-01T10:00:00,2024-01-01\n"
        );
    }

    #[test]
    fn test_duplicates_keep_source_columns_then_derived() {
        let dir = tempdir().unwrap();
        let sink = CsvDatasetSink::new(dir.path());
        let header: Vec<String> = ["user_id", "name", "email", "signup_date", "plan"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let user = NormalizedUser {
            row: UserRow {
                user_id: Some(UserId::new("4")),
                name: None,
                email: None,
                signup_date: "2024-03-03".to_string(),
                source_fields: vec!["4".into(), "".into(), "".into(), "2024-03-03".into(), "free".into()],
            },
            email_clean: None,
            first_name: String::new(),
            last_name: String::new(),
        };

        sink.write_duplicates(&header, &[user]).unwrap();

        let written = fs::read_to_string(sink.dataset_path(constants::DUPLICATE_EMAILS)).unwrap();
        assert_eq!(
            written,
            "user_id,name,email,signup_date,plan,email_clean,first_name,last_name\n\
             4,,,2024-03-03,free,,,\n"
        );
    }
}
