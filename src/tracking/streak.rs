use std::collections::BTreeSet;

use super::{date::CalendarDate, zone::previous_day};

/// Days on which something was checked in. Inserting a day twice is the same as inserting it once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckinSet(BTreeSet<CalendarDate>);

impl CheckinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the day was already present.
    pub fn insert(&mut self, date: CalendarDate) -> bool {
        self.0.insert(date)
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        self.0.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = CalendarDate> + '_ {
        self.0.iter().copied()
    }

    pub fn last(&self) -> Option<CalendarDate> {
        self.0.last().copied()
    }

    pub fn current_streak(&self, today: CalendarDate) -> u32 {
        let mut streak = 0;
        let mut expected = today;
        while self.0.contains(&expected) {
            streak += 1;
            expected = previous_day(expected);
        }
        streak
    }

    pub fn longest_streak(&self) -> u32 {
        runs(self.iter()).into_iter().max().unwrap_or(0)
    }

    /// Length of the run of consecutive days that ends at the most recent day.
    pub fn trailing_run(&self) -> u32 {
        runs(self.iter()).last().copied().unwrap_or(0)
    }
}

impl FromIterator<CalendarDate> for CheckinSet {
    fn from_iter<T: IntoIterator<Item = CalendarDate>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<CalendarDate> for CheckinSet {
    fn extend<T: IntoIterator<Item = CalendarDate>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

/// Number of consecutive days ending at `today` that are present in `dates`. A missing `today`
/// resets the streak to 0 no matter how long the run before it was.
pub fn current_streak(dates: impl IntoIterator<Item = CalendarDate>, today: CalendarDate) -> u32 {
    dates.into_iter().collect::<CheckinSet>().current_streak(today)
}

/// Longest run of consecutive days present in `dates`.
pub fn longest_streak(dates: impl IntoIterator<Item = CalendarDate>) -> u32 {
    dates.into_iter().collect::<CheckinSet>().longest_streak()
}

/// Splits ascending distinct days into lengths of consecutive runs.
fn runs(sorted: impl Iterator<Item = CalendarDate>) -> Vec<u32> {
    let mut result: Vec<u32> = vec![];
    let mut previous: Option<CalendarDate> = None;
    for date in sorted {
        match (previous, result.last_mut()) {
            (Some(previous), Some(run)) if date.days_since(previous) == 1 => *run += 1,
            _ => result.push(1),
        }
        previous = Some(date);
    }
    result
}
