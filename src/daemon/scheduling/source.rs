use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::storage::{entities::ReminderEntity, Store};

/// Where the scheduler gets reminders from and writes refreshed ones back to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderSource: Send + Sync {
    async fn active_reminders(&self) -> Result<Vec<ReminderEntity>>;

    /// Saves a refreshed next occurrence on the current version of reminder `id`. Reminders that
    /// are gone or inactive by now are left alone. Returns whether anything was saved.
    async fn update_next_occurrence(&self, id: Uuid, next: Option<DateTime<Utc>>) -> Result<bool>;
}

#[async_trait]
impl ReminderSource for Store {
    async fn active_reminders(&self) -> Result<Vec<ReminderEntity>> {
        Store::active_reminders(self).await
    }

    async fn update_next_occurrence(&self, id: Uuid, next: Option<DateTime<Utc>>) -> Result<bool> {
        self.set_next_occurrence(id, next).await
    }
}
