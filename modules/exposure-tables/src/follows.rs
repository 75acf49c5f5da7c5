use std::path::Path;

use exposure_common::{FollowEdge, RawFollowEdge};

use crate::columns::{AUTHOR_ID, FOLLOWER_ID};
use crate::io::{read_rows, write_atomically};
use crate::{Result, TableError};

pub const RESOLVED_COLUMNS: [&str; 4] = [AUTHOR_ID, FOLLOWER_ID, "repec_id", "follower_repec_id"];

/// Load the raw follow table (`author_id`, `follower_id`). Other columns are
/// ignored and ids are trimmed.
pub fn read_raw_follows(path: &Path) -> Result<Vec<RawFollowEdge>> {
    let edges = read_rows::<RawFollowEdge>(path, &[AUTHOR_ID, FOLLOWER_ID])?
        .into_iter()
        .map(|edge| RawFollowEdge {
            author_id: edge.author_id.trim().to_string(),
            follower_id: edge.follower_id.trim().to_string(),
        })
        .collect();
    Ok(edges)
}

/// Load a resolved follow table written by [`write_follows`].
pub fn read_follows(path: &Path) -> Result<Vec<FollowEdge>> {
    read_rows(path, &RESOLVED_COLUMNS)
}

pub fn write_follows(path: &Path, edges: &[FollowEdge]) -> Result<()> {
    write_atomically(path, |w| {
        // Written by hand so an empty graph still gets a header row.
        w.write_record(RESOLVED_COLUMNS).map_err(TableError::csv(path))?;
        for edge in edges {
            w.serialize(edge).map_err(TableError::csv(path))?;
        }
        Ok(())
    })
}
