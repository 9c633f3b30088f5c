use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::tracking::date::{CalendarDate, TimeOfDay};

/// A reminder that became due. Sent from the scheduler to the processing module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderNotification {
    pub reminder_id: Uuid,
    pub text: String,
    pub description: Option<String>,
    /// Day the reminder fired for, in the configured zone.
    pub date: CalendarDate,
    pub remind_at: TimeOfDay,
    pub fired_at: DateTime<Utc>,
}
