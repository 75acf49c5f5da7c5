use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{Reader, ReaderBuilder, StringRecord, Writer};
use serde::de::DeserializeOwned;

use crate::{Result, TableError};

/// Open a headed CSV file for reading.
pub fn open_reader(path: &Path) -> Result<Reader<File>> {
    let file = File::open(path).map_err(TableError::io(path))?;
    Ok(ReaderBuilder::new().flexible(true).from_reader(file))
}

/// Header row of `reader`, owned.
pub fn headers(reader: &mut Reader<File>, path: &Path) -> Result<StringRecord> {
    reader.headers().cloned().map_err(TableError::csv(path))
}

/// Index of each `names` column in `headers`, in the order given.
pub fn require_columns(headers: &StringRecord, table: &str, names: &[&str]) -> Result<Vec<usize>> {
    names
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == *name)
                .ok_or_else(|| TableError::MissingColumn {
                    table: table.to_string(),
                    column: name.to_string(),
                })
        })
        .collect()
}

/// Deserialize every row of a headed table by column name once `required`
/// is known to be present. Columns `T` does not name are ignored.
pub fn read_rows<T: DeserializeOwned>(path: &Path, required: &[&str]) -> Result<Vec<T>> {
    let mut reader = open_reader(path)?;
    let headers = headers(&mut reader, path)?;
    require_columns(&headers, &table_name(path), required)?;

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(TableError::csv(path))?;
    Ok(rows)
}

/// Field `index` of `record`, empty when the row is short.
pub fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

/// Write a CSV file via a sibling `.tmp` file that is renamed into place once
/// `write` succeeds, so readers never see a partial table.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut Writer<File>) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(TableError::io(parent))?;
    }

    let tmp = tmp_path(path);
    let file = File::create(&tmp).map_err(TableError::io(&tmp))?;
    let mut writer = Writer::from_writer(file);

    let written = write(&mut writer).and_then(|_| writer.flush().map_err(TableError::io(&tmp)));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    drop(writer);

    fs::rename(&tmp, path).map_err(TableError::io(path))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Short display name for a table in error messages.
pub fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
