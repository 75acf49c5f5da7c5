//! Weekly roster tables: `week,repec_users`.
//!
//! `repec_users` is a JSON array of strings. Rosters written by the older
//! tooling used a bracketed repr (`['a', 'b']`); those still load, but any id
//! containing `", "` or a quote cannot survive that form, so it is never
//! written.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use exposure_common::{ExposureError, WeeklyRoster};

use crate::columns::{REPEC_USERS, WEEK};
use crate::io::{field, headers, open_reader, require_columns, table_name, write_atomically};
use crate::{Result, TableError};

pub fn encode_users(users: &BTreeSet<String>) -> String {
    // Serializing a set of strings cannot fail.
    serde_json::to_string(users).unwrap_or_else(|_| "[]".to_string())
}

pub fn decode_users(week: &str, cell: &str) -> Result<BTreeSet<String>> {
    let cell = cell.trim();
    if let Ok(users) = serde_json::from_str::<BTreeSet<String>>(cell) {
        return Ok(users);
    }
    decode_legacy(cell).ok_or_else(|| TableError::RosterCell {
        week: week.to_string(),
        cell: cell.to_string(),
    })
}

fn decode_legacy(cell: &str) -> Option<BTreeSet<String>> {
    let inner = cell.strip_prefix('[')?.strip_suffix(']')?;
    let inner = inner.replace(['\'', '"'], "");
    Some(
        inner
            .split(", ")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

pub fn write_roster(path: &Path, roster: &WeeklyRoster) -> Result<()> {
    write_atomically(path, |w| {
        w.write_record([WEEK, REPEC_USERS]).map_err(TableError::csv(path))?;
        for (week, users) in roster.iter() {
            w.write_record([week.to_string(), encode_users(users)])
                .map_err(TableError::csv(path))?;
        }
        Ok(())
    })
}

/// Load a roster table. Missing weeks up to the largest listed week come back
/// as empty sets.
pub fn read_roster(path: &Path) -> Result<WeeklyRoster> {
    let mut reader = open_reader(path)?;
    let headers = headers(&mut reader, path)?;
    let cols = require_columns(&headers, &table_name(path), &[WEEK, REPEC_USERS])?;

    let mut weeks = BTreeMap::new();
    for record in reader.records() {
        let record = record.map_err(TableError::csv(path))?;
        let raw_week = field(&record, cols[0]).trim();
        // Weeks count from 1.
        let week = raw_week
            .parse::<u32>()
            .ok()
            .filter(|week| *week >= 1)
            .ok_or_else(|| ExposureError::Number {
                column: WEEK.to_string(),
                value: raw_week.to_string(),
            })?;
        let users = decode_users(raw_week, field(&record, cols[1]))?;
        weeks.entry(week).or_insert_with(BTreeSet::new).extend(users);
    }

    let max_week = weeks.keys().next_back().copied().unwrap_or(0);
    Ok(WeeklyRoster::dense(max_week, weeks))
}
