//! Shared utilities.

pub mod time;

pub use time::parse_duration;
