use std::path::Path;

use csv::StringRecord;

use crate::io::{field, headers, open_reader, require_columns, table_name, write_atomically};
use crate::{Result, TableError};

/// A whole CSV table kept as strings, for stages that must pass unknown
/// columns through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: StringRecord, rows: Vec<StringRecord>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn column(&self, name: &str) -> Result<usize> {
        Ok(require_columns(&self.headers, &self.name, &[name])?[0])
    }

    /// Index of `name`, appending an empty column when it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(i) = self.headers.iter().position(|h| h == name) {
            return i;
        }
        self.headers.push_field(name);
        let width = self.headers.len();
        for row in &mut self.rows {
            while row.len() < width {
                row.push_field("");
            }
        }
        width - 1
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Replace field `index` of `record`, padding short rows.
pub fn set_field(record: &StringRecord, index: usize, value: &str) -> StringRecord {
    let width = record.len().max(index + 1);
    (0..width)
        .map(|i| if i == index { value } else { field(record, i) })
        .collect()
}

pub fn read_table(path: &Path) -> Result<RawTable> {
    let mut reader = open_reader(path)?;
    let headers = headers(&mut reader, path)?;
    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(TableError::csv(path))?;
    Ok(RawTable::new(table_name(path), headers, rows))
}

pub fn write_table(path: &Path, table: &RawTable) -> Result<()> {
    write_atomically(path, |w| {
        w.write_record(&table.headers).map_err(TableError::csv(path))?;
        for row in &table.rows {
            w.write_record(row).map_err(TableError::csv(path))?;
        }
        Ok(())
    })
}
