/// Table and column names shared by the CSV adapters and the use case.
/// Column names only appear here and at the input/output boundary.

pub const USERS_TABLE: &str = "users";
pub const EVENTS_TABLE: &str = "events";

// Users columns
pub const USER_ID: &str = "user_id";
pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const SIGNUP_DATE: &str = "signup_date";

// Events columns
pub const EVENT_ID: &str = "event_id";
pub const USER_EMAIL: &str = "user_email";
pub const EVENT_TYPE: &str = "event_type";
pub const TIMESTAMP: &str = "timestamp";

// Derived columns
pub const EMAIL_CLEAN: &str = "email_clean";
pub const FIRST_NAME: &str = "first_name";
pub const LAST_NAME: &str = "last_name";
pub const EVENT_COUNT: &str = "event_count";

// Output datasets
pub const DUPLICATE_EMAILS: &str = "duplicate_emails";
pub const JOINED_EVENTS: &str = "joined_events";
pub const UNMATCHED_EVENT_IDS: &str = "unmatched_event_ids";
pub const USER_EVENT_COUNTS: &str = "user_event_counts";

/// All output datasets in the order they are written
pub fn output_datasets() -> Vec<&'static str> {
    vec![
        DUPLICATE_EMAILS,
        JOINED_EVENTS,
        UNMATCHED_EVENT_IDS,
        USER_EVENT_COUNTS,
    ]
}

/// File name of a dataset inside the output directory
pub fn dataset_file_name(dataset: &str) -> String {
    format!("{dataset}.csv")
}
