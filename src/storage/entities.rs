use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::tracking::{
    aggregate::TaskRecord,
    date::{CalendarDate, TimeOfDay},
    progress::CounterTarget,
    recurrence::{RecurrenceRule, ReminderDescriptor, Scheduled},
    zone::Zone,
};

/// Anything that can be stored in a journal file.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identity of the record. When a journal has several lines with the same key, the last one
    /// is the current state.
    fn key(&self) -> String;
}

/// Record that belongs to a calendar day and is stored in that day's file.
pub trait DatedRecord: Record {
    fn date(&self) -> CalendarDate;
}

/// Habit that is checked in at most once per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterEntity {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub target: CounterTarget,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl CounterEntity {
    pub fn new(name: String, icon: Option<String>, target: CounterTarget, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            icon,
            target,
            archived: false,
            created_at: now,
        }
    }
}

impl Record for CounterEntity {
    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// A check-in of a counter on some day. There is at most one per counter and day, checking in
/// again replaces the previous entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinEntity {
    pub counter_id: Uuid,
    pub date: CalendarDate,
    pub value: u32,
    pub created_at: DateTime<Utc>,
}

impl Record for CheckinEntity {
    fn key(&self) -> String {
        format!("{}/{}", self.counter_id, self.date)
    }
}

impl DatedRecord for CheckinEntity {
    fn date(&self) -> CalendarDate {
        self.date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntity {
    pub id: Uuid,
    pub title: String,
    pub date: CalendarDate,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Removed tasks stay in the journal but no longer count anywhere.
    #[serde(default)]
    pub removed: bool,
    pub created_at: DateTime<Utc>,
}

impl TaskEntity {
    pub fn new(title: String, date: CalendarDate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            date,
            completed: false,
            completed_at: None,
            removed: false,
            created_at: now,
        }
    }

    pub fn with_completed(self, completed: bool, now: DateTime<Utc>) -> Self {
        Self {
            completed,
            completed_at: completed.then_some(now),
            ..self
        }
    }
}

impl Record for TaskEntity {
    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl DatedRecord for TaskEntity {
    fn date(&self) -> CalendarDate {
        self.date
    }
}

impl From<&TaskEntity> for TaskRecord {
    fn from(value: &TaskEntity) -> Self {
        TaskRecord {
            date: value.date,
            completed: value.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEntity {
    pub id: Uuid,
    pub text: String,
    pub description: Option<String>,
    pub schedule: ReminderDescriptor,
    /// Removed reminders stay in the journal as inactive.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl ReminderEntity {
    /// Creates a reminder with its next occurrence already computed.
    pub fn new(
        text: String,
        description: Option<String>,
        rule: RecurrenceRule,
        remind_at: Option<TimeOfDay>,
        zone: &Zone,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            description,
            schedule: ReminderDescriptor::new(rule, remind_at, zone, now),
            active: true,
            created_at: now,
        }
    }
}

impl Record for ReminderEntity {
    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Scheduled for ReminderEntity {
    fn schedule(&self) -> &ReminderDescriptor {
        &self.schedule
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
