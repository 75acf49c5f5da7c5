//! Cell normalisation shared by every table reader.
//!
//! The upstream tables were produced by pandas, so missing values show up as
//! empty cells or as `nan`, and integer columns that once held a missing value
//! are written as floats (`"120.0"`).

use crate::ExposureError;

/// Trimmed cell value, or `None` for an empty/NaN cell.
pub fn non_null(value: &str) -> Option<String> {
    let value = value.trim();
    match value {
        "" | "nan" | "NaN" | "<NA>" => None,
        _ => Some(value.to_string()),
    }
}

/// Parse a non-negative integer count. Empty/NaN cells are `None`; whole
/// floats are accepted; anything else is an error.
pub fn parse_count(column: &str, value: &str) -> Result<Option<u64>, ExposureError> {
    let Some(value) = non_null(value) else {
        return Ok(None);
    };

    if let Ok(n) = value.parse::<u64>() {
        return Ok(Some(n));
    }

    match value.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(Some(f as u64)),
        _ => Err(ExposureError::Number {
            column: column.to_string(),
            value,
        }),
    }
}
