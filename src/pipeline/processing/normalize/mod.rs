//! Derived columns for both input tables: the cleaned email join key and,
//! for users, the first/last name split.

pub mod email;
pub mod name;

pub use email::normalize_email;
pub use name::{split_name, split_optional_name, NameParts};

use crate::domain::{EventRow, NormalizedEvent, NormalizedUser, UserRow};

/// Add `email_clean`, `first_name` and `last_name` to every user row
pub fn normalize_users(rows: Vec<UserRow>) -> Vec<NormalizedUser> {
    rows.into_iter()
        .map(|row| {
            let email_clean = normalize_email(row.email.as_deref());
            let NameParts { first, last } = split_optional_name(row.name.as_deref());
            NormalizedUser {
                row,
                email_clean,
                first_name: first,
                last_name: last,
            }
        })
        .collect()
}

/// Add `user_email_clean` to every event row
pub fn normalize_events(rows: Vec<EventRow>) -> Vec<NormalizedEvent> {
    rows.into_iter()
        .map(|row| NormalizedEvent {
            user_email_clean: normalize_email(row.user_email.as_deref()),
            row,
        })
        .collect()
}
