//! Periodic reminder checks. [scheduler::ReminderScheduler] wakes up every tick, decides which
//! reminders fire and keeps their cached next occurrence fresh.

pub mod fired;
pub mod scheduler;
pub mod source;
