pub mod types;
pub mod week;
pub mod config;
pub mod error;
pub mod values;

pub use types::*;
pub use week::{parse_timestamp, WeekClock};
pub use config::Config;
pub use error::ExposureError;
pub use values::{non_null, parse_count};
