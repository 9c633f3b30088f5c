use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::{
    date::{CalendarDate, TimeOfDay},
    zone::{weekday_index, Zone},
};

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Set of weekdays, 0 being Sunday and 6 Saturday. Values outside of that range are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u8>", into = "Vec<u8>")]
pub struct Weekdays(BTreeSet<u8>);

impl Weekdays {
    pub fn new(days: impl IntoIterator<Item = u8>) -> Self {
        Self(days.into_iter().filter(|v| *v < 7).collect())
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        self.0.contains(&weekday_index(date))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<u8>> for Weekdays {
    fn from(value: Vec<u8>) -> Self {
        Weekdays::new(value)
    }
}

impl From<Weekdays> for Vec<u8> {
    fn from(value: Weekdays) -> Self {
        value.0.into_iter().collect()
    }
}

impl Display for Weekdays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self
            .iter()
            .map(|v| WEEKDAY_NAMES[v as usize])
            .collect::<Vec<_>>();
        write!(f, "{}", names.join(","))
    }
}

/// Accepts comma separated names ("mon,fri", "Monday") or numbers with 0 being Sunday.
impl FromStr for Weekdays {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut days = BTreeSet::new();
        for part in s.split(',').map(str::trim).filter(|v| !v.is_empty()) {
            let day = match part.parse::<u8>() {
                Ok(v) if v < 7 => v,
                Ok(v) => return Err(anyhow!("Weekday {v} is out of range 0..6")),
                Err(_) => part
                    .parse::<Weekday>()
                    .map_err(|_| anyhow!("Unknown weekday {part}"))?
                    .num_days_from_sunday() as u8,
            };
            days.insert(day);
        }
        Ok(Weekdays(days))
    }
}

/// How a reminder repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecurrenceRule {
    Once,
    Daily,
    /// Fires on the listed weekdays. An empty set never fires.
    Weekly { weekdays: Weekdays },
}

impl Display for RecurrenceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrenceRule::Once => write!(f, "once"),
            RecurrenceRule::Daily => write!(f, "daily"),
            RecurrenceRule::Weekly { weekdays } => write!(f, "weekly({weekdays})"),
        }
    }
}

/// Scheduling part of a reminder. `next_occurrence` is a cache of [next_occurrence] and may lag
/// behind until the next [ReminderDescriptor::refresh].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDescriptor {
    pub rule: RecurrenceRule,
    pub remind_at: Option<TimeOfDay>,
    pub next_occurrence: Option<DateTime<Utc>>,
}

impl ReminderDescriptor {
    /// Creates a descriptor with an up to date cache.
    pub fn new(
        rule: RecurrenceRule,
        remind_at: Option<TimeOfDay>,
        zone: &Zone,
        now: DateTime<Utc>,
    ) -> Self {
        let next_occurrence = next_occurrence(&rule, remind_at, zone, now);
        Self {
            rule,
            remind_at,
            next_occurrence,
        }
    }

    /// Recomputes the cached next occurrence. Returns true if it changed.
    pub fn refresh(&mut self, zone: &Zone, now: DateTime<Utc>) -> bool {
        let next = next_occurrence(&self.rule, self.remind_at, zone, now);
        let changed = next != self.next_occurrence;
        self.next_occurrence = next;
        changed
    }

    /// Whether the reminder belongs to `date`. One time reminders only know their day through the
    /// cached next occurrence.
    pub fn is_due_on(&self, date: CalendarDate, zone: &Zone) -> bool {
        match &self.rule {
            RecurrenceRule::Daily => true,
            RecurrenceRule::Weekly { weekdays } => weekdays.contains(date),
            RecurrenceRule::Once => self
                .next_occurrence
                .is_some_and(|next| zone.today(next) == date),
        }
    }
}

/// Anything carrying a reminder schedule.
pub trait Scheduled {
    fn schedule(&self) -> &ReminderDescriptor;

    fn is_active(&self) -> bool {
        true
    }
}

impl Scheduled for ReminderDescriptor {
    fn schedule(&self) -> &ReminderDescriptor {
        self
    }
}

/// Computes the next instant a reminder should fire, strictly after `now`.
///
/// Today's slot is used while it's still ahead of `now`. A slot equal to `now` counts as passed,
/// so a reminder can't fire twice on the boundary. Returns [None] when the reminder has no time,
/// a one time reminder already passed, or a weekly rule has no weekdays.
pub fn next_occurrence(
    rule: &RecurrenceRule,
    time: Option<TimeOfDay>,
    zone: &Zone,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let time = time?;
    let today = zone.today(now);
    let candidate = zone.at(today, time);

    let fires_today = match rule {
        RecurrenceRule::Once | RecurrenceRule::Daily => true,
        RecurrenceRule::Weekly { weekdays } => weekdays.contains(today),
    };
    if candidate > now && fires_today {
        return Some(candidate);
    }

    match rule {
        RecurrenceRule::Once => None,
        RecurrenceRule::Daily => Some(zone.at(today.add_days(1), time)),
        RecurrenceRule::Weekly { weekdays } => (1..=7)
            .map(|step| today.add_days(step))
            .find(|day| weekdays.contains(*day))
            .map(|day| zone.at(day, time)),
    }
}

/// Active items whose cached next occurrence falls within `[now, now + horizon]`, soonest first.
pub fn upcoming<T: Scheduled>(items: &[T], now: DateTime<Utc>, horizon: Duration) -> Vec<&T> {
    let until = now + horizon;
    let mut result = items
        .iter()
        .filter(|v| v.is_active())
        .filter(|v| {
            v.schedule()
                .next_occurrence
                .is_some_and(|next| next >= now && next <= until)
        })
        .collect::<Vec<_>>();
    result.sort_by_key(|v| v.schedule().next_occurrence);
    result
}
