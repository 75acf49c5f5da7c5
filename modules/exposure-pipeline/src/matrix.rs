use exposure_common::{ActivityMatrix, ActivityRow, User, WeeklyRoster};

/// Expand a weekly roster into one binary row per user.
///
/// Every user in `users` gets a row, in table order, whether or not they ever
/// appear in the roster. Users without a RePEc id never match.
pub fn activity_matrix(roster: &WeeklyRoster, users: &[User]) -> ActivityMatrix {
    let weeks = roster.max_week();

    let rows = users
        .iter()
        .map(|user| ActivityRow {
            author_id: user.id.clone(),
            repec_id: user.repec_id.clone(),
            number_of_followers: user.followers_count,
            following_count: user.following_count,
            cells: (1..=weeks)
                .map(|week| {
                    user.repec_id
                        .as_deref()
                        .is_some_and(|id| roster.contains(week, id))
                })
                .collect(),
        })
        .collect();

    ActivityMatrix { weeks, rows }
}
