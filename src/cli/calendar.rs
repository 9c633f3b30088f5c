use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use clap::CommandFactory;

use crate::{
    storage::record_storage::DateWindow,
    tracking::calendar::{month_bounds, month_view},
};

use super::{output::heat_map, session::Session, Args};

/// Reads `YYYY-MM`, the current month when missing.
fn parse_month(value: Option<&str>, session: &Session) -> Result<(i32, u32)> {
    let Some(value) = value else {
        let today = session.today();
        return Ok((today.year(), today.month()));
    };
    match NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d") {
        Ok(date) => Ok((date.year(), date.month())),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Month {value} should look like 2024-03: {e}"),
            )
            .into()),
    }
}

pub async fn process_calendar_command(month: Option<&str>, session: &Session) -> Result<String> {
    let (year, month) = parse_month(month, session)?;
    let invalid = || {
        Args::command().error(
            clap::error::ErrorKind::ValueValidation,
            format!("{year}-{month} is not a month"),
        )
    };
    let (first, last) = month_bounds(year, month).ok_or_else(invalid)?;
    let records = session.store.task_records(DateWindow::new(first, last)).await?;
    let view = month_view(year, month, &records, session.today()).ok_or_else(invalid)?;
    Ok(heat_map(&view))
}
