use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Opaque user identifier as it appears in the users table.
///
/// Ids that parse as integers order numerically and come before any
/// non-numeric id; everything else orders lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for UserId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<i64>(), other.0.parse::<i64>()) {
            // Tie-break on the text so "01" and "1" stay distinct
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for UserId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A row of the users table, validated at the input boundary
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    /// Absent when the source cell is empty
    pub user_id: Option<UserId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub signup_date: String,
    /// Every cell of the source row, in header order
    pub source_fields: Vec<String>,
}

/// The users table with its full source header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTable {
    pub header: Vec<String>,
    pub rows: Vec<UserRow>,
}

/// A row of the events table, validated at the input boundary
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub event_id: String,
    pub user_email: Option<String>,
    pub event_type: String,
    pub timestamp: String,
}

/// A user row with its derived join key and name parts
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedUser {
    pub row: UserRow,
    pub email_clean: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

/// An event row with its derived join key
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub row: EventRow,
    pub user_email_clean: Option<String>,
}

/// One event paired with at most one matching user.
/// Only lives between the join and the partition step.
/// `user_id()` is absent both for unmatched events and for matched users
/// whose id cell was empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedRow<'a> {
    pub event: &'a NormalizedEvent,
    pub user: Option<&'a NormalizedUser>,
}

impl<'a> JoinedRow<'a> {
    pub fn user_id(&self) -> Option<&'a UserId> {
        self.user.and_then(|user| user.row.user_id.as_ref())
    }
}

/// A matched event projected to the joined_events schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalRow {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub event_type: String,
    pub timestamp: String,
    pub signup_date: String,
}

/// An event that found no user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedRow {
    pub event_id: String,
}

/// Number of matched events for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEventCount {
    pub user_id: UserId,
    pub event_count: usize,
}
