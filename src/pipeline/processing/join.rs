use std::collections::HashMap;
use tracing::debug;

use crate::domain::{JoinedRow, NormalizedEvent, NormalizedUser};

/// A cleaned email that is empty carries no identity
fn join_key(email_clean: Option<&str>) -> Option<&str> {
    email_clean.filter(|key| !key.is_empty())
}

/// Left-join events onto users by cleaned email.
///
/// Output follows event order. An event matching several users yields one
/// row per user, in user-table order. Absent and empty keys never match
/// anything.
pub fn left_join<'a>(
    events: &'a [NormalizedEvent],
    users: &'a [NormalizedUser],
) -> Vec<JoinedRow<'a>> {
    let mut users_by_email: HashMap<&str, Vec<&NormalizedUser>> = HashMap::new();
    for user in users {
        if let Some(key) = join_key(user.email_clean.as_deref()) {
            users_by_email.entry(key).or_default().push(user);
        }
    }

    let mut joined = Vec::with_capacity(events.len());
    for event in events {
        let matches =
            join_key(event.user_email_clean.as_deref()).and_then(|key| users_by_email.get(key));

        match matches {
            Some(matched) => {
                joined.extend(matched.iter().map(|user| JoinedRow {
                    event,
                    user: Some(*user),
                }));
            }
            None => joined.push(JoinedRow { event, user: None }),
        }
    }

    debug!(
        events = events.len(),
        users = users.len(),
        joined = joined.len(),
        "Left join finished"
    );
    joined
}
