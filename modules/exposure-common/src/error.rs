use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExposureError {
    #[error("Unparseable timestamp: {value:?}")]
    Timestamp { value: String },

    #[error("Invalid number in column {column}: {value:?}")]
    Number { column: String, value: String },

    #[error("User id column is not unique. Non-unique ids: {0:?}")]
    DuplicateUserId(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
