use std::path::Path;

use exposure_common::ActivityMatrix;

use crate::io::write_atomically;
use crate::{Result, TableError};

/// Write a mentions/interacted matrix:
/// `author_id,repec_id,number_of_followers,following_count,week1..weekN`.
pub fn write_matrix(path: &Path, matrix: &ActivityMatrix) -> Result<()> {
    write_atomically(path, |w| {
        w.write_record(matrix.columns()).map_err(TableError::csv(path))?;

        for row in &matrix.rows {
            let mut record = Vec::with_capacity(4 + matrix.weeks as usize);
            record.push(row.author_id.clone());
            record.push(row.repec_id.clone().unwrap_or_default());
            record.push(count_cell(row.number_of_followers));
            record.push(count_cell(row.following_count));
            record.extend((1..=matrix.weeks).map(|week| if row.is_active(week) { "1" } else { "0" }.to_string()));

            w.write_record(&record).map_err(TableError::csv(path))?;
        }
        Ok(())
    })
}

fn count_cell(count: Option<u64>) -> String {
    count.map(|n| n.to_string()).unwrap_or_default()
}
