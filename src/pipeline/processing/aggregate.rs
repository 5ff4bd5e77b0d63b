use std::collections::BTreeMap;

use crate::domain::{FinalRow, UserEventCount, UserId};

/// Count matched events per user, ascending by user id.
pub fn count_events_per_user(matched: &[FinalRow]) -> Vec<UserEventCount> {
    let mut counts: BTreeMap<&UserId, usize> = BTreeMap::new();
    for row in matched {
        *counts.entry(&row.user_id).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(user_id, event_count)| UserEventCount {
            user_id: user_id.clone(),
            event_count,
        })
        .collect()
}
