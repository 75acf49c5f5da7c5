//! Splitting the message log into per-topic logs.

use chrono::{DateTime, SecondsFormat, Utc};
use csv::StringRecord;
use exposure_common::parse_timestamp;
use exposure_common::config::TopicConfig;
use exposure_tables::columns::{AUTHOR_ID, CREATED_AT, REPEC_ID, TEXT};
use exposure_tables::io::field;
use exposure_tables::raw::set_field;
use exposure_tables::{RawTable, Result};

use super::identity::user_index;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLog {
    /// Messages by identified authors after the cutoff, oldest first.
    pub table: RawTable,
    pub unresolved: usize,
    pub before_cutoff: usize,
}

/// Keep messages whose author has a RePEc id (taking the id from the user
/// table) and that were posted after `since`, sorted by `created_at`.
pub fn resolve_and_sort(
    messages: &RawTable,
    users: &RawTable,
    since: DateTime<Utc>,
) -> Result<ResolvedLog> {
    messages.column(TEXT)?;
    let author_col = messages.column(AUTHOR_ID)?;
    let created_col = messages.column(CREATED_AT)?;
    let index = user_index(users)?;

    let mut headers = messages.headers.clone();
    let repec_col = match messages.column(REPEC_ID) {
        Ok(i) => i,
        Err(_) => {
            headers.push_field(REPEC_ID);
            headers.len() - 1
        }
    };

    let mut unresolved = 0;
    let mut before_cutoff = 0;
    let mut kept: Vec<(DateTime<Utc>, StringRecord)> = Vec::new();

    for row in &messages.rows {
        let Some(repec_id) = index.resolve(field(row, author_col).trim()) else {
            unresolved += 1;
            continue;
        };
        let ts = parse_timestamp(field(row, created_col))?;
        if ts <= since {
            before_cutoff += 1;
            continue;
        }

        let row = set_field(row, repec_col, repec_id);
        let row = set_field(&row, created_col, &ts.to_rfc3339_opts(SecondsFormat::AutoSi, true));
        kept.push((ts, row));
    }

    kept.sort_by_key(|(ts, _)| *ts);

    Ok(ResolvedLog {
        table: RawTable::new(
            messages.name.clone(),
            headers,
            kept.into_iter().map(|(_, row)| row).collect(),
        ),
        unresolved,
        before_cutoff,
    })
}

/// Messages whose `text` contains any of the topic's keywords, ignoring case.
pub fn select_topic(log: &RawTable, topic: &TopicConfig) -> Result<RawTable> {
    let text_col = log.column(TEXT)?;
    let keywords: Vec<String> = topic
        .keywords
        .iter()
        .map(|k| k.to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let rows = log
        .rows
        .iter()
        .filter(|row| {
            let text = field(row, text_col).to_lowercase();
            keywords.iter().any(|k| text.contains(k.as_str()))
        })
        .cloned()
        .collect();

    Ok(RawTable::new(topic.name.clone(), log.headers.clone(), rows))
}
