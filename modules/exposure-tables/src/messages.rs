use std::path::Path;

use exposure_common::{non_null, parse_timestamp, Message};

use crate::columns::{CREATED_AT, REPEC_ID};
use crate::io::{field, headers, open_reader, require_columns, table_name};
use crate::{Result, TableError};

/// Load the message log. A malformed `created_at` aborts the load.
pub fn read_messages(path: &Path) -> Result<Vec<Message>> {
    let mut reader = open_reader(path)?;
    let headers = headers(&mut reader, path)?;
    let cols = require_columns(&headers, &table_name(path), &[REPEC_ID, CREATED_AT])?;

    let mut messages = Vec::new();
    for record in reader.records() {
        let record = record.map_err(TableError::csv(path))?;
        messages.push(Message {
            repec_id: non_null(field(&record, cols[0])),
            created_at: parse_timestamp(field(&record, cols[1]))?,
        });
    }
    Ok(messages)
}
