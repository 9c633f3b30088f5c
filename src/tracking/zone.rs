use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Duration, LocalResult, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::utils::clock::Clock;

use super::date::{CalendarDate, TimeOfDay};

/// Zone used when the user never configured one.
pub const DEFAULT_TIME_ZONE: &str = "Africa/Tunis";

/// IANA time zone every "today" and "now" of the application is resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone(Tz);

impl Zone {
    /// Resolves a zone name. Unknown names silently degrade to UTC so that a bad setting never
    /// stops the application from working.
    pub fn resolve(name: &str) -> Zone {
        Self::parse(name).unwrap_or_else(|e| {
            warn!("{e}, falling back to UTC");
            Zone::utc()
        })
    }

    /// Strict version of [Zone::resolve] for validating user input.
    pub fn parse(name: &str) -> Result<Zone> {
        name.trim()
            .parse::<Tz>()
            .map(Zone)
            .map_err(|_| anyhow!("Unknown time zone {name}"))
    }

    pub fn utc() -> Zone {
        Zone(Tz::UTC)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    pub fn local(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        now.with_timezone(&self.0)
    }

    pub fn today(&self, now: DateTime<Utc>) -> CalendarDate {
        self.local(now).date_naive().into()
    }

    pub fn time_of_day(&self, now: DateTime<Utc>) -> TimeOfDay {
        self.local(now).time().into()
    }

    /// Converts a wall clock time on `date` into an instant. Ambiguous times pick the earlier
    /// instant; times skipped by a DST jump are moved forward by an hour.
    pub fn at(&self, date: CalendarDate, time: TimeOfDay) -> DateTime<Utc> {
        let naive = date.naive().and_time(time.naive());
        match self.0.from_local_datetime(&naive) {
            LocalResult::Single(v) => v.to_utc(),
            LocalResult::Ambiguous(earliest, _) => earliest.to_utc(),
            LocalResult::None => self
                .0
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .map(|v| v.to_utc())
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
        }
    }
}

impl Default for Zone {
    fn default() -> Self {
        Zone::resolve(DEFAULT_TIME_ZONE)
    }
}

/// Current date as observed in `zone`.
pub fn today_in(zone: &Zone, clock: &dyn Clock) -> CalendarDate {
    zone.today(clock.time())
}

/// Current wall clock time in `zone`.
pub fn now_time_in(zone: &Zone, clock: &dyn Clock) -> TimeOfDay {
    zone.time_of_day(clock.time())
}

pub fn add_days(date: CalendarDate, days: i64) -> CalendarDate {
    date.add_days(days)
}

pub fn previous_day(date: CalendarDate) -> CalendarDate {
    date.add_days(-1)
}

/// Monday on or before `date`. Sundays belong to the week that started 6 days earlier.
pub fn start_of_week(date: CalendarDate) -> CalendarDate {
    date.add_days(-(date.weekday().num_days_from_monday() as i64))
}

/// Day of the week with 0 being Sunday.
pub fn weekday_index(date: CalendarDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{TimeZone, Utc};

    use crate::{tracking::date::CalendarDate, utils::clock::ManualClock};

    use super::{now_time_in, previous_day, start_of_week, today_in, weekday_index, Zone};

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    #[test]
    fn today_depends_on_zone() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        assert_eq!(Zone::resolve("UTC").today(now), date("2024-01-01"));
        assert_eq!(Zone::resolve("Africa/Tunis").today(now), date("2024-01-02"));
        assert_eq!(Zone::resolve("America/New_York").today(now), date("2024-01-01"));
    }

    #[test]
    fn invalid_zone_falls_back_to_utc() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        let zone = Zone::resolve("Mars/Olympus_Mons");
        assert_eq!(zone, Zone::utc());
        assert_eq!(zone.today(now), date("2024-01-01"));
        assert!(Zone::parse("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn time_of_day_is_local() -> Result<()> {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 7, 5, 42).unwrap();
        assert_eq!(Zone::resolve("Africa/Tunis").time_of_day(now), "08:05".parse()?);
        Ok(())
    }

    #[test]
    fn clock_readings_use_zone() -> Result<()> {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap());
        let tunis = Zone::resolve("Africa/Tunis");
        assert_eq!(today_in(&tunis, &clock), date("2024-01-02"));
        assert_eq!(now_time_in(&tunis, &clock), "00:30".parse()?);

        clock.advance(chrono::Duration::minutes(45));
        assert_eq!(now_time_in(&Zone::utc(), &clock), "00:15".parse()?);
        Ok(())
    }

    #[test]
    fn previous_day_crosses_year() {
        assert_eq!(previous_day(date("2024-01-01")), date("2023-12-31"));
        assert_eq!(previous_day(date("2024-03-01")), date("2024-02-29"));
    }

    #[test]
    fn start_of_week_is_monday() {
        // 2024-01-10 is a Wednesday
        assert_eq!(start_of_week(date("2024-01-10")), date("2024-01-08"));
        assert_eq!(start_of_week(date("2024-01-08")), date("2024-01-08"));
        // Sunday goes back 6 days
        assert_eq!(start_of_week(date("2024-01-14")), date("2024-01-08"));
    }

    #[test]
    fn weekday_index_starts_on_sunday() {
        assert_eq!(weekday_index(date("2024-01-07")), 0);
        assert_eq!(weekday_index(date("2024-01-08")), 1);
        assert_eq!(weekday_index(date("2024-01-13")), 6);
    }

    #[test]
    fn wall_time_in_dst_gap_moves_forward() -> Result<()> {
        // Clocks in New York jump from 02:00 to 03:00 on 2024-03-10.
        let zone = Zone::resolve("America/New_York");
        let instant = zone.at(date("2024-03-10"), "02:30".parse()?);
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap());
        Ok(())
    }
}
