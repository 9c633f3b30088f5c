use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_english::{parse_date_string, Dialect};

use crate::tracking::{date::CalendarDate, zone::Zone};

/// Reads a day given on the command line. `YYYY-MM-DD` is tried first, then phrases like
/// "yesterday" or "last friday" relative to `now` in `zone`. Numeric dates use day/month/year.
pub fn parse_day_argument(value: &str, zone: &Zone, now: DateTime<Utc>) -> Result<CalendarDate> {
    if let Ok(date) = value.parse::<CalendarDate>() {
        return Ok(date);
    }
    let parsed = parse_date_string(value, zone.local(now), Dialect::Uk)
        .map_err(|e| anyhow!("Can't understand date \"{value}\": {e}"))?;
    Ok(parsed.date_naive().into())
}

/// Resolves an optional day argument, falling back to today in `zone`.
pub fn day_or_today(value: Option<&str>, zone: &Zone, now: DateTime<Utc>) -> Result<CalendarDate> {
    match value {
        Some(value) => parse_day_argument(value, zone, now),
        None => Ok(zone.today(now)),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{TimeZone, Utc};

    use crate::tracking::zone::Zone;

    use super::{day_or_today, parse_day_argument};

    #[test]
    fn parses_iso_and_phrases() -> Result<()> {
        let zone = Zone::resolve("Africa/Tunis");
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        assert_eq!(parse_day_argument("2024-01-03", &zone, now)?, "2024-01-03".parse()?);
        assert_eq!(parse_day_argument("yesterday", &zone, now)?, "2024-01-09".parse()?);
        assert!(parse_day_argument("the day after never", &zone, now).is_err());
        Ok(())
    }

    #[test]
    fn missing_day_is_zone_today() -> Result<()> {
        let zone = Zone::resolve("Africa/Tunis");
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 23, 30, 0).unwrap();
        assert_eq!(day_or_today(None, &zone, now)?, "2024-01-11".parse()?);
        Ok(())
    }
}
