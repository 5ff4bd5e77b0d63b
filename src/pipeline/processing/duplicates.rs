use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::domain::NormalizedUser;

/// How users without an email take part in duplicate detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicatePolicy {
    /// When true, every user whose cleaned email is absent lands in one
    /// shared group and is flagged once that group has two or more rows.
    pub null_emails_are_duplicates: bool,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        Self {
            null_emails_are_duplicates: true,
        }
    }
}

/// Return every user whose cleaned email is shared with at least one other
/// user. All members of a group are returned, in input order.
pub fn find_duplicates<'a>(
    users: &'a [NormalizedUser],
    policy: DuplicatePolicy,
) -> Vec<&'a NormalizedUser> {
    let mut group_sizes: HashMap<Option<&str>, usize> = HashMap::new();
    for user in users {
        let key = user.email_clean.as_deref();
        if key.is_none() && !policy.null_emails_are_duplicates {
            continue;
        }
        *group_sizes.entry(key).or_insert(0) += 1;
    }

    let duplicates: Vec<&NormalizedUser> = users
        .iter()
        .filter(|user| {
            group_sizes
                .get(&user.email_clean.as_deref())
                .is_some_and(|size| *size >= 2)
        })
        .collect();

    let null_flagged = duplicates
        .iter()
        .filter(|user| user.email_clean.is_none())
        .count();
    if null_flagged > 0 {
        warn!(
            rows = null_flagged,
            "Users without an email were flagged as duplicates of each other"
        );
    }

    debug!(
        users = users.len(),
        duplicates = duplicates.len(),
        "Duplicate detection finished"
    );
    duplicates
}
