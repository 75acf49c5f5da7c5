//! Linking social accounts to RePEc profiles.

use std::collections::HashMap;

use csv::StringRecord;
use exposure_common::non_null;
use exposure_tables::columns::{AUTHOR_ID, ID, REPEC_ID, USERNAME};
use exposure_tables::io::field;
use exposure_tables::raw::set_field;
use exposure_tables::{RawTable, Result};

use crate::IdentityIndex;

pub const TWITTER_ACCOUNT: &str = "Twitter Account";
pub const REPEC_SHORT_ID: &str = "RePEc Short-ID";

/// `"@Jane Doe "` -> `"janedoe"`.
pub fn normalize_handle(handle: &str) -> String {
    handle.replace(['@', ' '], "").to_lowercase()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryMerge {
    pub table: RawTable,
    pub matched: usize,
}

/// Left-join the economists directory onto the user table by handle.
///
/// Every user row is kept with its `username` lowercased and a `RePEc_id`
/// column set from the directory (empty when no handle matches). When two
/// directory rows share a handle the first one wins.
pub fn merge_directory(users: &RawTable, directory: &RawTable) -> Result<DirectoryMerge> {
    let handle_col = directory.column(TWITTER_ACCOUNT)?;
    let short_id_col = directory.column(REPEC_SHORT_ID)?;
    let username_col = users.column(USERNAME)?;

    let mut by_handle: HashMap<String, String> = HashMap::new();
    for row in &directory.rows {
        let handle = normalize_handle(field(row, handle_col));
        if handle.is_empty() {
            continue;
        }
        by_handle
            .entry(handle)
            .or_insert_with(|| field(row, short_id_col).trim().to_string());
    }

    let mut table = users.clone();
    let repec_col = table.ensure_column(REPEC_ID);
    let mut matched = 0;

    table.rows = table
        .rows
        .iter()
        .map(|row| {
            let username = field(row, username_col).to_lowercase();
            let repec_id = by_handle.get(&username).map(String::as_str).unwrap_or("");
            if !repec_id.is_empty() {
                matched += 1;
            }
            set_field(&set_field(row, username_col, &username), repec_col, repec_id)
        })
        .collect::<Vec<StringRecord>>();

    Ok(DirectoryMerge { table, matched })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Backfill {
    pub table: RawTable,
    /// Messages whose empty `RePEc_id` was filled from the user table.
    pub filled: usize,
}

/// Fill empty `RePEc_id` cells in the message log from the user table via
/// `author_id -> id`. Existing ids are never overwritten.
pub fn backfill_repec_ids(messages: &RawTable, users: &RawTable) -> Result<Backfill> {
    let index = user_index(users)?;
    let author_col = messages.column(AUTHOR_ID)?;
    let repec_col = messages.column(REPEC_ID)?;

    let mut filled = 0;
    let rows = messages
        .rows
        .iter()
        .map(|row| {
            if non_null(field(row, repec_col)).is_some() {
                return row.clone();
            }
            match index.resolve(field(row, author_col).trim()) {
                Some(repec_id) => {
                    filled += 1;
                    set_field(row, repec_col, repec_id)
                }
                None => row.clone(),
            }
        })
        .collect();

    Ok(Backfill {
        table: RawTable::new(messages.name.clone(), messages.headers.clone(), rows),
        filled,
    })
}

/// Identity index over a raw user table's `id` and `RePEc_id` columns.
pub fn user_index(users: &RawTable) -> Result<IdentityIndex> {
    let id_col = users.column(ID)?;
    let repec_col = users.column(REPEC_ID)?;
    let index = IdentityIndex::from_pairs(users.rows.iter().map(|row| {
        (
            field(row, id_col).trim().to_string(),
            non_null(field(row, repec_col)),
        )
    }))?;
    Ok(index)
}
