use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::tracking::date::CalendarDate;

/// Reminders already fired on the current day. Moving to another day forgets them.
#[derive(Debug, Default)]
pub struct FiredSet {
    date: Option<CalendarDate>,
    fired: HashSet<Uuid>,
}

impl FiredSet {
    pub fn roll_to(&mut self, today: CalendarDate) {
        if self.date == Some(today) {
            return;
        }
        if !self.fired.is_empty() {
            debug!("New day {today}, forgetting {} fired reminders", self.fired.len());
        }
        self.fired.clear();
        self.date = Some(today);
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.fired.contains(&id)
    }

    /// Returns false when `id` already fired today.
    pub fn insert(&mut self, id: Uuid) -> bool {
        self.fired.insert(id)
    }
}
