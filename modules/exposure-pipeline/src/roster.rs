//! Weekly rosters: who authored a message each week, and who was exposed to
//! one through a direct follow.

use std::collections::{BTreeMap, BTreeSet};

use exposure_common::{FollowEdge, Message, WeekClock, WeeklyRoster};

use crate::followers_by_author;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterBuild {
    pub roster: WeeklyRoster,
    /// Messages dated before the epoch; they have no week.
    pub before_epoch: usize,
    /// Messages with no RePEc id; they count toward the week range only.
    pub unidentified: usize,
}

/// Bucket messages into weeks and collect the distinct authors of each week.
///
/// The roster covers every week from 1 to the latest message's week, with
/// empty sets for silent weeks. The result does not depend on message order.
pub fn authors_roster(messages: &[Message], clock: &WeekClock) -> RosterBuild {
    let mut weeks: BTreeMap<u32, BTreeSet<String>> = BTreeMap::new();
    let mut max_week = 0;
    let mut before_epoch = 0;
    let mut unidentified = 0;

    for message in messages {
        let Some(week) = clock.week_of(message.created_at) else {
            before_epoch += 1;
            continue;
        };
        max_week = max_week.max(week);

        match &message.repec_id {
            Some(repec_id) => {
                weeks.entry(week).or_default().insert(repec_id.clone());
            }
            None => unidentified += 1,
        }
    }

    RosterBuild {
        roster: WeeklyRoster::dense(max_week, weeks),
        before_epoch,
        unidentified,
    }
}

/// Extend each week's authors with their direct followers (one hop).
///
/// Weeks are expanded independently; followers of followers are not added.
pub fn exposed_roster(authors: &WeeklyRoster, edges: &[FollowEdge]) -> WeeklyRoster {
    let followers = followers_by_author(edges);

    let weeks = authors
        .iter()
        .map(|(week, users)| {
            let mut exposed = users.clone();
            for author in users {
                if let Some(direct) = followers.get(author.as_str()) {
                    exposed.extend(direct.iter().map(|f| f.to_string()));
                }
            }
            (week, exposed)
        })
        .collect();

    WeeklyRoster::dense(authors.max_week(), weeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn clock() -> WeekClock {
        WeekClock::new(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap())
    }

    fn msg(repec: Option<&str>, week: u32, hours: i64) -> Message {
        Message {
            repec_id: repec.map(str::to_string),
            created_at: clock().week_start(week) + Duration::hours(hours),
        }
    }

    fn edge(author: &str, follower: &str) -> FollowEdge {
        FollowEdge {
            author_id: format!("id-{author}"),
            follower_id: format!("id-{follower}"),
            repec_id: author.to_string(),
            follower_repec_id: follower.to_string(),
        }
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn authors_are_distinct_per_week() {
        let build = authors_roster(
            &[msg(Some("A"), 1, 1), msg(Some("A"), 1, 30), msg(Some("B"), 2, 0)],
            &clock(),
        );

        assert_eq!(build.roster.week(1), Some(&set(&["A"])));
        assert_eq!(build.roster.week(2), Some(&set(&["B"])));
        assert_eq!(build.roster.max_week(), 2);
    }

    #[test]
    fn silent_weeks_are_present_and_empty() {
        let build = authors_roster(&[msg(Some("A"), 1, 0), msg(Some("B"), 4, 0)], &clock());

        assert_eq!(build.roster.len(), 4);
        assert!(build.roster.week(2).unwrap().is_empty());
        assert!(build.roster.week(3).unwrap().is_empty());
    }

    #[test]
    fn order_does_not_matter() {
        let mut messages = vec![
            msg(Some("C"), 3, 2),
            msg(Some("A"), 1, 0),
            msg(Some("B"), 3, 1),
            msg(Some("A"), 2, 5),
        ];
        let forward = authors_roster(&messages, &clock());
        messages.reverse();
        let backward = authors_roster(&messages, &clock());
        assert_eq!(forward, backward);
    }

    #[test]
    fn pre_epoch_and_anonymous_messages_are_counted_not_listed() {
        let early = Message {
            repec_id: Some("Z".into()),
            created_at: clock().epoch() - Duration::days(1),
        };
        let build = authors_roster(&[early, msg(None, 2, 0), msg(Some("A"), 1, 0)], &clock());

        assert_eq!(build.before_epoch, 1);
        assert_eq!(build.unidentified, 1);
        assert_eq!(build.roster.max_week(), 2);
        assert!(build.roster.week(2).unwrap().is_empty());
        assert!(!build.roster.iter().any(|(_, users)| users.contains("Z")));
    }

    #[test]
    fn no_messages_gives_empty_roster() {
        let build = authors_roster(&[], &clock());
        assert!(build.roster.is_empty());
    }

    #[test]
    fn exposure_adds_direct_followers_only() {
        let authors = authors_roster(&[msg(Some("A"), 1, 0)], &clock()).roster;
        // C follows A, D follows C.
        let exposed = exposed_roster(&authors, &[edge("A", "C"), edge("C", "D")]);

        assert_eq!(exposed.week(1), Some(&set(&["A", "C"])));
    }

    #[test]
    fn exposure_is_per_week() {
        let authors = authors_roster(&[msg(Some("A"), 1, 0), msg(Some("B"), 2, 0)], &clock()).roster;
        let exposed = exposed_roster(&authors, &[edge("A", "C")]);

        assert!(exposed.contains(1, "C"));
        assert!(!exposed.contains(2, "C"));
    }

    #[test]
    fn exposure_contains_authorship() {
        let authors = authors_roster(
            &[msg(Some("A"), 1, 0), msg(Some("B"), 1, 0), msg(Some("C"), 3, 0)],
            &clock(),
        )
        .roster;
        let exposed = exposed_roster(&authors, &[edge("B", "A"), edge("C", "E")]);

        assert_eq!(exposed.len(), authors.len());
        for (week, users) in authors.iter() {
            assert!(users.is_subset(exposed.week(week).unwrap()));
        }
    }
}
