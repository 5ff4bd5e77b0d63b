use crate::domain::{FinalRow, JoinedRow, UnmatchedRow};

/// Joined rows split by whether a user was attached
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitioned {
    pub matched: Vec<FinalRow>,
    pub unmatched: Vec<UnmatchedRow>,
}

/// Send each joined row to exactly one side, keeping join order on both.
/// A row is matched iff it carries a `user_id`.
pub fn partition(joined: &[JoinedRow<'_>]) -> Partitioned {
    let mut out = Partitioned::default();
    for row in joined {
        match (row.user, row.user_id()) {
            (Some(user), Some(user_id)) => out.matched.push(FinalRow {
                user_id: user_id.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                event_type: row.event.row.event_type.clone(),
                timestamp: row.event.row.timestamp.clone(),
                signup_date: user.row.signup_date.clone(),
            }),
            _ => out.unmatched.push(UnmatchedRow {
                event_id: row.event.row.event_id.clone(),
            }),
        }
    }
    out
}
