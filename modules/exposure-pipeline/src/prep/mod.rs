//! Preparation of the raw scrape into the message log and user table the
//! panel is built from.

pub mod repair;
pub mod identity;
pub mod topics;
