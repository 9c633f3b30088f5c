//! Habits, tasks and reminders kept in plain files and driven from the terminal.
//!
//! [tracking] holds the date, streak, recurrence and aggregation rules and never touches the
//! clock or the disk itself. [storage] keeps records in append only journals, [cli] and [daemon]
//! glue the two together.

pub mod cli;
pub mod daemon;
pub mod settings;
pub mod storage;
pub mod tracking;
pub mod utils;
