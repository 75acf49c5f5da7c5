//! Repair of the raw message dump.
//!
//! The scraper wrote message text verbatim, so a newline inside a tweet split
//! one record over several physical lines. Lines are re-joined until they
//! parse as a record with the header's width, then every row is type-checked.

use chrono::{Datelike, SecondsFormat};
use csv::{ReaderBuilder, StringRecord};
use exposure_common::{parse_count, parse_timestamp};
use exposure_tables::columns::CREATED_AT;
use exposure_tables::io::field;
use exposure_tables::{RawTable, Result};

pub const NUMERIC_COLUMNS: [&str; 5] = [
    "retweet_count",
    "reply_count",
    "like_count",
    "quote_count",
    "impression_count",
];
const IMPRESSION_COUNT: usize = 4;

/// Impressions were only collected from 2023 on; earlier zeros mean "unknown".
const FIRST_IMPRESSION_YEAR: i32 = 2023;

#[derive(Debug, Clone, PartialEq)]
pub struct Stitched {
    pub table: RawTable,
    /// Physical lines folded into a preceding record.
    pub lines_joined: usize,
    /// True when the dump ended inside an unfinished record.
    pub tail_discarded: bool,
}

/// Rebuild records from a dump whose fields may contain raw newlines.
pub fn stitch_rows(name: &str, text: &str) -> Stitched {
    let mut lines = text.lines();
    let headers: StringRecord = lines
        .next()
        .map(|h| h.trim().split(',').collect())
        .unwrap_or_default();
    let width = headers.len();

    let mut rows = Vec::new();
    let mut pending = String::new();
    let mut pending_lines = 0;
    let mut lines_joined = 0;

    for line in lines {
        let joined = format!("{pending} {}", line.trim());
        let joined = joined.trim();
        pending_lines += 1;

        match parse_complete(joined, width) {
            Some(record) => {
                rows.push(record);
                lines_joined += pending_lines - 1;
                pending.clear();
                pending_lines = 0;
            }
            None => pending = joined.to_string(),
        }
    }

    Stitched {
        table: RawTable::new(name, headers, rows),
        lines_joined,
        tail_discarded: !pending.is_empty(),
    }
}

fn parse_complete(line: &str, width: usize) -> Option<StringRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let record = reader.records().next()?.ok()?;
    (record.len() == width).then_some(record)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedMessages {
    pub table: RawTable,
    /// Rows dropped for an unparseable count or timestamp.
    pub dropped: usize,
}

/// Type-check and normalise the stitched dump.
///
/// - counts must be non-negative integers and `created_at` a timestamp, or
///   the row is dropped
/// - `created_at` is rewritten as UTC RFC 3339
/// - empty `referenced_id` becomes `NA`, empty `referenced_type` becomes `own`
/// - `impression_count` of 0 before 2023 is blanked
pub fn clean_messages(table: &RawTable) -> Result<CleanedMessages> {
    let created_at = table.column(CREATED_AT)?;
    let numeric = NUMERIC_COLUMNS
        .iter()
        .map(|c| table.column(c))
        .collect::<Result<Vec<_>>>()?;
    let referenced_id = table.column("referenced_id").ok();
    let referenced_type = table.column("referenced_type").ok();

    let mut rows = Vec::with_capacity(table.len());
    let mut dropped = 0;

    for row in &table.rows {
        let Ok(ts) = parse_timestamp(field(row, created_at)) else {
            dropped += 1;
            continue;
        };
        let counts: Option<Vec<u64>> = numeric
            .iter()
            .zip(NUMERIC_COLUMNS)
            .map(|(&i, name)| parse_count(name, field(row, i)).ok().flatten())
            .collect();
        let Some(counts) = counts else {
            dropped += 1;
            continue;
        };

        let mut cleaned: Vec<String> = row.iter().map(str::to_string).collect();
        cleaned.resize(table.headers.len().max(cleaned.len()), String::new());

        cleaned[created_at] = ts.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        for (&i, count) in numeric.iter().zip(&counts) {
            cleaned[i] = count.to_string();
        }
        if ts.year() < FIRST_IMPRESSION_YEAR && counts[IMPRESSION_COUNT] == 0 {
            cleaned[numeric[IMPRESSION_COUNT]] = String::new();
        }
        if let Some(i) = referenced_id {
            if cleaned[i].trim().is_empty() {
                cleaned[i] = "NA".to_string();
            }
        }
        if let Some(i) = referenced_type {
            if cleaned[i].trim().is_empty() {
                cleaned[i] = "own".to_string();
            }
        }

        rows.push(StringRecord::from(cleaned));
    }

    Ok(CleanedMessages {
        table: RawTable::new(table.name.clone(), table.headers.clone(), rows),
        dropped,
    })
}
