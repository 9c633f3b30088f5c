//! Turns flat lists of dated tasks into per day statistics used by the analytics view.
//!
//! Days without any task are left out of every series. Filling them with zeros would draw dips
//! for days when the user wasn't tracking anything yet.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::utils::percentage::Percentage;

use super::{date::CalendarDate, streak::CheckinSet};

/// Minimal view of a task needed for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRecord {
    pub date: CalendarDate,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayTally {
    pub total: u32,
    pub done: u32,
}

impl DayTally {
    pub fn add(&mut self, completed: bool) {
        self.total += 1;
        if completed {
            self.done += 1;
        }
    }

    pub fn pct(&self) -> u32 {
        completion_pct(self.total, self.done)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyStat {
    pub date: CalendarDate,
    pub total: u32,
    pub done: u32,
    pub pct: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub overall_pct: u32,
    pub active_days: u32,
    pub current_task_streak: u32,
    pub longest_task_streak: u32,
}

/// Rounded share of completed items. No items means 0%.
pub fn completion_pct(total: u32, done: u32) -> u32 {
    *Percentage::rounded(done, total)
}

/// Groups records by their day, keeping only days in `[since, today]` that have records.
pub fn bucket_by_date(
    records: &[TaskRecord],
    since: CalendarDate,
    today: CalendarDate,
) -> BTreeMap<CalendarDate, DayTally> {
    let mut buckets = BTreeMap::<CalendarDate, DayTally>::new();
    for record in records
        .iter()
        .filter(|v| v.date >= since && v.date <= today)
    {
        buckets.entry(record.date).or_default().add(record.completed);
    }
    buckets
}

/// Statistics for the trailing `days` days ending at `today`, oldest first.
pub fn daily_series(records: &[TaskRecord], days: u32, today: CalendarDate) -> Vec<DailyStat> {
    if days == 0 {
        return vec![];
    }
    let since = today.add_days(-(days as i64 - 1));
    bucket_by_date(records, since, today)
        .into_iter()
        .map(|(date, tally)| DailyStat {
            date,
            total: tally.total,
            done: tally.done,
            pct: tally.pct(),
        })
        .collect()
}

/// Streak over days with at least one completed task. Unlike check-in streaks, a completion streak
/// survives one day without completions, it's only over when the last completion is older than
/// yesterday.
pub fn task_completion_streak(
    dates: impl IntoIterator<Item = CalendarDate>,
    today: CalendarDate,
) -> StreakSummary {
    let set = dates.into_iter().collect::<CheckinSet>();
    let Some(last) = set.last() else {
        return StreakSummary::default();
    };
    let ongoing = last == today || last == today.add_days(-1);
    StreakSummary {
        current: if ongoing { set.trailing_run() } else { 0 },
        longest: set.longest_streak(),
    }
}

/// First day of the analytics window for a lookback of `days`.
pub fn analytics_since(days: u32, today: CalendarDate) -> CalendarDate {
    today.add_days(-(days as i64))
}

/// Summary numbers over the analytics window `[today - days, today]`.
pub fn summarize(records: &[TaskRecord], days: u32, today: CalendarDate) -> AnalyticsSummary {
    let buckets = bucket_by_date(records, analytics_since(days, today), today);
    let (total_tasks, completed_tasks) = buckets
        .values()
        .fold((0, 0), |(total, done), v| (total + v.total, done + v.done));
    let streak = task_completion_streak(
        buckets
            .iter()
            .filter(|(_, v)| v.done > 0)
            .map(|(date, _)| *date),
        today,
    );
    AnalyticsSummary {
        total_tasks,
        completed_tasks,
        overall_pct: completion_pct(total_tasks, completed_tasks),
        active_days: buckets.len() as u32,
        current_task_streak: streak.current,
        longest_task_streak: streak.longest,
    }
}

#[cfg(test)]
mod tests {
    use crate::tracking::date::CalendarDate;

    use super::{
        bucket_by_date, completion_pct, daily_series, summarize, task_completion_streak,
        StreakSummary, TaskRecord,
    };

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn task(s: &str, completed: bool) -> TaskRecord {
        TaskRecord {
            date: date(s),
            completed,
        }
    }

    fn dates(values: &[&str]) -> Vec<CalendarDate> {
        values.iter().map(|v| date(v)).collect()
    }

    #[test]
    fn completion_pct_rounds() {
        assert_eq!(completion_pct(0, 0), 0);
        assert_eq!(completion_pct(3, 1), 33);
        assert_eq!(completion_pct(3, 2), 67);
        assert_eq!(completion_pct(4, 4), 100);
    }

    #[test]
    fn bucket_by_date_is_sparse_and_windowed() {
        let records = [
            task("2024-01-01", true),
            task("2024-01-03", true),
            task("2024-01-03", false),
            task("2024-01-05", true),
            task("2023-12-31", true),
        ];
        let buckets = bucket_by_date(&records, date("2024-01-01"), date("2024-01-04"));
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[&date("2024-01-03")].total, 2);
        assert_eq!(buckets[&date("2024-01-03")].done, 1);
        assert!(!buckets.contains_key(&date("2024-01-02")));
    }

    #[test]
    fn daily_series_skips_empty_days() {
        let records = [
            task("2024-01-01", true),
            task("2024-01-03", true),
            task("2024-01-03", false),
            task("2024-01-03", false),
            task("2024-01-05", true),
        ];
        let series = daily_series(&records, 5, date("2024-01-05"));
        assert_eq!(
            series.iter().map(|v| v.date).collect::<Vec<_>>(),
            dates(&["2024-01-01", "2024-01-03", "2024-01-05"])
        );
        assert_eq!(series[1].pct, 33);

        let shorter = daily_series(&records, 3, date("2024-01-05"));
        assert_eq!(shorter.len(), 2);
        assert!(daily_series(&records, 0, date("2024-01-05")).is_empty());
    }

    #[test]
    fn task_streak_allows_a_day_of_grace() {
        let run = dates(&["2024-01-02", "2024-01-03", "2024-01-04"]);
        assert_eq!(
            task_completion_streak(run.clone(), date("2024-01-04")),
            StreakSummary {
                current: 3,
                longest: 3
            }
        );
        assert_eq!(task_completion_streak(run.clone(), date("2024-01-05")).current, 3);
        assert_eq!(
            task_completion_streak(run, date("2024-01-06")),
            StreakSummary {
                current: 0,
                longest: 3
            }
        );
    }

    #[test]
    fn task_streak_current_is_last_run() {
        let all = dates(&["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-06", "2024-01-07"]);
        assert_eq!(
            task_completion_streak(all, date("2024-01-07")),
            StreakSummary {
                current: 2,
                longest: 3
            }
        );
        assert_eq!(
            task_completion_streak(vec![], date("2024-01-07")),
            StreakSummary::default()
        );
    }

    #[test]
    fn summarize_counts_window() {
        let records = [
            task("2024-01-01", true),
            task("2024-01-02", true),
            task("2024-01-02", false),
            task("2024-01-03", false),
            task("2024-01-04", true),
            task("2023-11-01", true),
        ];
        let summary = summarize(&records, 30, date("2024-01-04"));
        assert_eq!(summary.total_tasks, 5);
        assert_eq!(summary.completed_tasks, 3);
        assert_eq!(summary.overall_pct, 60);
        assert_eq!(summary.active_days, 4);
        // 2024-01-03 had no completion
        assert_eq!(summary.current_task_streak, 1);
        assert_eq!(summary.longest_task_streak, 2);
    }

    #[test]
    fn summarize_empty() {
        let summary = summarize(&[], 90, date("2024-01-04"));
        assert_eq!(summary.overall_pct, 0);
        assert_eq!(summary.active_days, 0);
        assert_eq!(summary.current_task_streak, 0);
    }

    #[test]
    fn huge_lookback_covers_everything() {
        let records = [task("1999-06-01", true), task("2024-01-05", false)];
        let summary = summarize(&records, u32::MAX, date("2024-01-05"));
        assert_eq!(summary.total_tasks, 2);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(daily_series(&records, u32::MAX, date("2024-01-05")).len(), 2);
        assert_eq!(summarize(&[], 200_000_000, date("2024-01-05")).total_tasks, 0);
    }
}
