use serde::{Deserialize, Serialize};

use crate::utils::percentage::Percentage;

use super::{date::CalendarDate, streak::CheckinSet, zone::start_of_week};

/// What a counter is trying to reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CounterTarget {
    /// One check-in every day.
    #[default]
    Daily,
    /// `value` check-ins during each ISO week.
    Weekly { value: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterStats {
    pub total_checkins: u32,
    pub last_30_checkins: u32,
    pub last_7_checkins: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub dates: Vec<CalendarDate>,
}

/// Check-in counts over the whole history and the last 30 and 7 days.
pub fn counter_stats(checkins: &CheckinSet, today: CalendarDate) -> CounterStats {
    let count_since = |days: i64| {
        let since = today.add_days(-days);
        checkins.iter().filter(|v| *v >= since).count() as u32
    };
    CounterStats {
        total_checkins: checkins.len() as u32,
        last_30_checkins: count_since(30),
        last_7_checkins: count_since(7),
        current_streak: checkins.current_streak(today),
        longest_streak: checkins.longest_streak(),
        dates: checkins.iter().collect(),
    }
}

/// Check-ins made since the Monday of the current week.
pub fn checkins_this_week(checkins: &CheckinSet, today: CalendarDate) -> u32 {
    let week_start = start_of_week(today);
    checkins
        .iter()
        .filter(|v| *v >= week_start && *v <= today)
        .count() as u32
}

/// How far along a counter is towards its target today.
pub fn counter_progress(
    target: CounterTarget,
    checkins: &CheckinSet,
    today: CalendarDate,
) -> Percentage {
    match target {
        CounterTarget::Daily if checkins.contains(today) => Percentage::FULL,
        CounterTarget::Daily => Percentage::ZERO,
        CounterTarget::Weekly { value } => {
            Percentage::of_target(checkins_this_week(checkins, today), value)
        }
    }
}
