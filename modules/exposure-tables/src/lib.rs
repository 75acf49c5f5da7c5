//! CSV readers and writers for every table the pipeline touches.

pub mod columns;
pub mod error;
pub mod io;
pub mod raw;
pub mod users;
pub mod follows;
pub mod messages;
pub mod roster;
pub mod matrix;

pub use error::{Result, TableError};
pub use raw::RawTable;
