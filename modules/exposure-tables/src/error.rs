use std::path::PathBuf;

use exposure_common::ExposureError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TableError>;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{table} is missing required column {column:?}")]
    MissingColumn { table: String, column: String },

    #[error("Unreadable roster cell for week {week}: {cell:?}")]
    RosterCell { week: String, cell: String },

    #[error(transparent)]
    Value(#[from] ExposureError),
}

impl TableError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| TableError::Io { path, source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>) -> impl FnOnce(csv::Error) -> Self {
        let path = path.into();
        move |source| TableError::Csv { path, source }
    }
}
