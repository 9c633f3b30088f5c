use chrono::Months;

use super::{
    aggregate::{bucket_by_date, DayTally, TaskRecord},
    date::CalendarDate,
    zone::start_of_week,
};

/// Shade of a day in the calendar heat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeatLevel {
    /// Padding day from the previous or next month.
    OutsideMonth,
    /// No tasks at all.
    Empty,
    /// Tasks exist, none completed.
    Untouched,
    /// Up to half of the tasks completed.
    Started,
    /// More than half completed.
    Most,
    Complete,
}

pub fn heat_level(tally: Option<DayTally>, in_month: bool) -> HeatLevel {
    if !in_month {
        return HeatLevel::OutsideMonth;
    }
    let Some(tally) = tally.filter(|v| v.total > 0) else {
        return HeatLevel::Empty;
    };
    let ratio = tally.done as f64 / tally.total as f64;
    if ratio >= 1. {
        HeatLevel::Complete
    } else if ratio > 0.5 {
        HeatLevel::Most
    } else if ratio > 0. {
        HeatLevel::Started
    } else {
        HeatLevel::Untouched
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: CalendarDate,
    pub in_month: bool,
    pub is_today: bool,
    pub tally: Option<DayTally>,
    pub level: HeatLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub first: CalendarDate,
    pub last: CalendarDate,
    /// Whole weeks, Monday to Sunday, so the length is always a multiple of 7.
    pub cells: Vec<CalendarCell>,
}

impl MonthView {
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }
}

/// First and last day of a month. [None] for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(CalendarDate, CalendarDate)> {
    let first = CalendarDate::from_ymd_opt(year, month, 1)?;
    let next = first.naive().checked_add_months(Months::new(1))?;
    Some((first, CalendarDate::from(next).add_days(-1)))
}

/// Days shown for a month: from the Monday on or before the 1st to the Sunday on or after the
/// last day.
pub fn month_grid(year: i32, month: u32) -> Option<Vec<CalendarDate>> {
    let (first, last) = month_bounds(year, month)?;
    let start = start_of_week(first);
    let end = start_of_week(last).add_days(6);
    Some(
        (0..=end.days_since(start))
            .map(|offset| start.add_days(offset))
            .collect(),
    )
}

/// Heat map of task completion for a month.
pub fn month_view(
    year: i32,
    month: u32,
    records: &[TaskRecord],
    today: CalendarDate,
) -> Option<MonthView> {
    let (first, last) = month_bounds(year, month)?;
    let buckets = bucket_by_date(records, first, last);
    let cells = month_grid(year, month)?
        .into_iter()
        .map(|date| {
            let in_month = date >= first && date <= last;
            let tally = buckets.get(&date).copied();
            CalendarCell {
                date,
                in_month,
                is_today: date == today,
                tally,
                level: heat_level(tally, in_month),
            }
        })
        .collect();
    Some(MonthView { first, last, cells })
}
