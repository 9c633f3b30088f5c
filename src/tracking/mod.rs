//! Date arithmetic behind streaks, reminders and statistics.
//!
//! Everything here is pure: callers pass in the zone and the current instant (usually taken from a
//! [Clock](crate::utils::clock::Clock)) and get plain values back. Nothing in this module touches
//! storage.

pub mod aggregate;
pub mod calendar;
pub mod date;
pub mod progress;
pub mod recurrence;
pub mod streak;
pub mod zone;
