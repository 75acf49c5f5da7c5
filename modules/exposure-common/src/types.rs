use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Identity ---

/// A row of the user-info table. Only the columns the panel needs are kept;
/// other profile fields are ignored on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Source-platform account id.
    pub id: String,
    /// RePEc short id. `None` excludes the user from graph-based stages.
    pub repec_id: Option<String>,
    pub followers_count: Option<u64>,
    pub following_count: Option<u64>,
}

// --- Follow graph ---

/// One row of the raw follow table: `follower_id` follows `author_id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawFollowEdge {
    pub author_id: String,
    pub follower_id: String,
}

/// A follow edge whose endpoints both resolved to a RePEc id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowEdge {
    pub author_id: String,
    pub follower_id: String,
    pub repec_id: String,
    pub follower_repec_id: String,
}

// --- Messages ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub repec_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Weekly rosters ---

/// Week number -> set of RePEc ids. Weeks are dense from 1 to `max_week()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyRoster {
    weeks: BTreeMap<u32, BTreeSet<String>>,
}

impl WeeklyRoster {
    /// Build a roster covering weeks `1..=max_week`, filling any week absent
    /// from `weeks` with an empty set. Entries outside that range are dropped.
    pub fn dense(max_week: u32, mut weeks: BTreeMap<u32, BTreeSet<String>>) -> Self {
        let weeks = (1..=max_week)
            .map(|week| (week, weeks.remove(&week).unwrap_or_default()))
            .collect();
        Self { weeks }
    }

    pub fn max_week(&self) -> u32 {
        self.weeks.keys().next_back().copied().unwrap_or(0)
    }

    pub fn week(&self, week: u32) -> Option<&BTreeSet<String>> {
        self.weeks.get(&week)
    }

    pub fn contains(&self, week: u32, repec_id: &str) -> bool {
        self.weeks
            .get(&week)
            .is_some_and(|users| users.contains(repec_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &BTreeSet<String>)> {
        self.weeks.iter().map(|(week, users)| (*week, users))
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Total number of (week, user) memberships.
    pub fn memberships(&self) -> usize {
        self.weeks.values().map(BTreeSet::len).sum()
    }
}

// --- Activity matrices ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub author_id: String,
    pub repec_id: Option<String>,
    pub number_of_followers: Option<u64>,
    pub following_count: Option<u64>,
    /// `cells[i]` is week `i + 1`.
    pub cells: Vec<bool>,
}

impl ActivityRow {
    pub fn is_active(&self, week: u32) -> bool {
        week >= 1 && self.cells.get(week as usize - 1).copied().unwrap_or(false)
    }
}

/// One row per known user, one binary column per week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityMatrix {
    pub weeks: u32,
    pub rows: Vec<ActivityRow>,
}

impl ActivityMatrix {
    pub const FIXED_COLUMNS: [&'static str; 4] = [
        "author_id",
        "repec_id",
        "number_of_followers",
        "following_count",
    ];

    /// Column names in output order.
    pub fn columns(&self) -> Vec<String> {
        Self::FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain((1..=self.weeks).map(|week| format!("week{week}")))
            .collect()
    }

    /// Number of set cells across the whole matrix.
    pub fn active_cells(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.cells.iter().filter(|c| **c).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dense_roster_fills_gaps() {
        let mut weeks = BTreeMap::new();
        weeks.insert(1, set(&["A"]));
        weeks.insert(3, set(&["B"]));
        let roster = WeeklyRoster::dense(3, weeks);

        assert_eq!(roster.len(), 3);
        assert_eq!(roster.week(2), Some(&BTreeSet::new()));
        assert!(roster.contains(3, "B"));
        assert_eq!(roster.max_week(), 3);
    }

    #[test]
    fn dense_roster_drops_out_of_range_weeks() {
        let mut weeks = BTreeMap::new();
        weeks.insert(0, set(&["A"]));
        weeks.insert(5, set(&["B"]));
        let roster = WeeklyRoster::dense(2, weeks);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.memberships(), 0);
    }

    #[test]
    fn empty_roster_has_no_weeks() {
        let roster = WeeklyRoster::default();
        assert_eq!(roster.max_week(), 0);
        assert!(roster.is_empty());
    }

    #[test]
    fn matrix_columns_follow_fixed_prefix() {
        let matrix = ActivityMatrix { weeks: 2, rows: vec![] };
        assert_eq!(
            matrix.columns(),
            vec![
                "author_id",
                "repec_id",
                "number_of_followers",
                "following_count",
                "week1",
                "week2"
            ]
        );
    }

    #[test]
    fn week_zero_is_never_active() {
        let row = ActivityRow {
            author_id: "1".into(),
            repec_id: Some("A".into()),
            number_of_followers: None,
            following_count: None,
            cells: vec![true],
        };
        assert!(!row.is_active(0));
        assert!(row.is_active(1));
        assert!(!row.is_active(2));
    }
}
