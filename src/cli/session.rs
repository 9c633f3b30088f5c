use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::CommandFactory;
use tracing::debug;

use crate::{
    settings::Settings,
    storage::Store,
    tracking::{
        date::CalendarDate,
        zone::{today_in, Zone},
    },
    utils::{clock::Clock, time::day_or_today},
};

use super::Args;

/// Everything a command needs about the current user: where their data is, their settings and
/// the zone "today" is resolved in.
pub struct Session {
    pub dir: PathBuf,
    pub settings: Settings,
    pub zone: Zone,
    pub store: Store,
    pub clock: Box<dyn Clock>,
}

impl Session {
    /// `tz` overrides the configured zone for this run only. Unlike the settings file it must be a
    /// valid zone name.
    pub fn open(dir: &Path, tz: Option<&str>, clock: Box<dyn Clock>) -> Result<Self> {
        let settings = Settings::load(dir)?;
        let zone = match tz {
            Some(tz) => Zone::parse(tz).map_err(|e| {
                Args::command().error(clap::error::ErrorKind::ValueValidation, e.to_string())
            })?,
            None => settings.zone(),
        };
        debug!("Opening {dir:?} in {}", zone.name());
        Ok(Self {
            dir: dir.to_path_buf(),
            store: Store::open(&dir.join("records"))?,
            settings,
            zone,
            clock,
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.time()
    }

    pub fn today(&self) -> CalendarDate {
        today_in(&self.zone, self.clock.as_ref())
    }

    /// Day given on the command line, today when missing.
    pub fn day(&self, value: Option<&str>) -> Result<CalendarDate> {
        day_or_today(value, &self.zone, self.now()).map_err(|e| {
            Args::command()
                .error(clap::error::ErrorKind::ValueValidation, e.to_string())
                .into()
        })
    }
}
