use std::path::Path;

use exposure_common::{non_null, parse_count, User};
use tracing::debug;

use crate::columns::{FOLLOWERS_COUNT, FOLLOWING_COUNT, ID, REPEC_ID};
use crate::io::{field, headers, open_reader, require_columns, table_name};
use crate::{Result, TableError};

/// Load the user-info table. Profile columns beyond the four the panel needs
/// are ignored.
pub fn read_users(path: &Path) -> Result<Vec<User>> {
    let mut reader = open_reader(path)?;
    let headers = headers(&mut reader, path)?;
    let cols = require_columns(
        &headers,
        &table_name(path),
        &[ID, REPEC_ID, FOLLOWERS_COUNT, FOLLOWING_COUNT],
    )?;

    let mut users = Vec::new();
    for record in reader.records() {
        let record = record.map_err(TableError::csv(path))?;
        users.push(User {
            id: field(&record, cols[0]).trim().to_string(),
            repec_id: non_null(field(&record, cols[1])),
            followers_count: parse_count(FOLLOWERS_COUNT, field(&record, cols[2]))?,
            following_count: parse_count(FOLLOWING_COUNT, field(&record, cols[3]))?,
        });
    }

    debug!(path = %path.display(), users = users.len(), "Loaded users");
    Ok(users)
}
