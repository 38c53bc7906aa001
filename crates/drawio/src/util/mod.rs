//! Utility modules.

pub mod datetime;

pub use datetime::{Clock, FixedClock, SystemClock, format_timestamp, parse_timestamp};
