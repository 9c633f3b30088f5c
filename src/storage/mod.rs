//!  Storage is organized through [record_storage::RecordStorage].
//!  The basic idea is:
//!   - There is a directory with all the records.
//!   - Tasks and check-ins live in one file per calendar day, counters and reminders in a single
//!     file each.
//!   - Files are append only. Updating a record appends its new version, reading keeps the last
//!     version of each record.

pub mod entities;
pub mod record_storage;

use std::{collections::HashMap, path::Path};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::tracking::{aggregate::TaskRecord, date::CalendarDate, streak::CheckinSet};

use entities::{CheckinEntity, CounterEntity, ReminderEntity, TaskEntity};
use record_storage::{DateWindow, DayJournal, Journal, RecordStorage};

/// Every journal of one user.
pub struct Store {
    pub tasks: DayJournal<TaskEntity>,
    pub checkins: DayJournal<CheckinEntity>,
    pub counters: Journal<CounterEntity>,
    pub reminders: Journal<ReminderEntity>,
}

impl Store {
    pub fn open(records_dir: &Path) -> Result<Self> {
        Ok(Self {
            tasks: DayJournal::new(records_dir.join("tasks"))?,
            checkins: DayJournal::new(records_dir.join("checkins"))?,
            counters: Journal::new(records_dir.join("counters"))?,
            reminders: Journal::new(records_dir.join("reminders"))?,
        })
    }

    pub async fn active_counters(&self) -> Result<Vec<CounterEntity>> {
        let mut counters = self.counters.load().await?;
        counters.retain(|v| !v.archived);
        Ok(counters)
    }

    /// Finds an active counter by id prefix or by name.
    pub async fn find_counter(&self, query: &str) -> Result<CounterEntity> {
        let counters = self.active_counters().await?;
        if let Some(counter) = counters
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(query.trim()))
        {
            return Ok(counter.clone());
        }
        find_by_id_prefix(counters, query, |v| v.id, "counter")
    }

    /// Records a check-in. Checking in twice on one day keeps a single entry.
    pub async fn check_in(
        &self,
        counter: &CounterEntity,
        date: CalendarDate,
        now: DateTime<Utc>,
    ) -> Result<CheckinEntity> {
        let checkin = CheckinEntity {
            counter_id: counter.id,
            date,
            value: 1,
            created_at: now,
        };
        self.checkins.write(checkin.clone()).await?;
        Ok(checkin)
    }

    /// Days on which `counter_id` was checked in, over the whole history.
    pub async fn checkin_set(&self, counter_id: Uuid) -> Result<CheckinSet> {
        Ok(self
            .checkin_sets()
            .await?
            .remove(&counter_id)
            .unwrap_or_default())
    }

    /// Check-in days of every counter, read in one pass over the history.
    pub async fn checkin_sets(&self) -> Result<HashMap<Uuid, CheckinSet>> {
        let mut sets = HashMap::<Uuid, CheckinSet>::new();
        for checkin in self.checkins.read_all().await? {
            sets.entry(checkin.counter_id)
                .or_default()
                .insert(checkin.date);
        }
        Ok(sets)
    }

    /// Tasks planned inside `window`, without removed ones.
    pub async fn planned_tasks(&self, window: DateWindow) -> Result<Vec<TaskEntity>> {
        let mut tasks = self.tasks.read(window).await?;
        tasks.retain(|v| !v.removed);
        Ok(tasks)
    }

    pub async fn task_records(&self, window: DateWindow) -> Result<Vec<TaskRecord>> {
        Ok(self
            .planned_tasks(window)
            .await?
            .iter()
            .map(TaskRecord::from)
            .collect())
    }

    pub async fn find_task(&self, prefix: &str, date: CalendarDate) -> Result<TaskEntity> {
        let tasks = self.planned_tasks(DateWindow::day(date)).await?;
        find_by_id_prefix(tasks, prefix, |v| v.id, "task")
    }

    pub async fn active_reminders(&self) -> Result<Vec<ReminderEntity>> {
        let mut reminders = self.reminders.load().await?;
        reminders.retain(|v| v.active);
        Ok(reminders)
    }

    pub async fn find_reminder(&self, prefix: &str) -> Result<ReminderEntity> {
        find_by_id_prefix(self.active_reminders().await?, prefix, |v| v.id, "reminder")
    }

    /// Stores a new cached next occurrence on the latest version of reminder `id`. Nothing is
    /// written when the reminder was removed meanwhile. Returns whether it was written.
    pub async fn set_next_occurrence(
        &self,
        id: Uuid,
        next: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let Some(mut reminder) = self
            .reminders
            .load()
            .await?
            .into_iter()
            .find(|v| v.id == id && v.active)
        else {
            return Ok(false);
        };
        reminder.schedule.next_occurrence = next;
        self.reminders.write(reminder).await?;
        Ok(true)
    }
}

/// Ids are long, so any unambiguous prefix is accepted.
fn find_by_id_prefix<T>(
    items: Vec<T>,
    prefix: &str,
    id: impl Fn(&T) -> Uuid,
    kind: &str,
) -> Result<T> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(anyhow!("Empty {kind} id"));
    }
    let mut matching = items
        .into_iter()
        .filter(|v| id(v).to_string().starts_with(&prefix))
        .collect::<Vec<_>>();
    match matching.len() {
        0 => Err(anyhow!("No {kind} matches {prefix}")),
        1 => Ok(matching.remove(0)),
        n => Err(anyhow!("{n} {kind}s match {prefix}, use a longer id")),
    }
}
