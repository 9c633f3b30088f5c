use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tracking::zone::{Zone, DEFAULT_TIME_ZONE};

const SETTINGS_FILE: &str = "settings.json";

/// User preferences stored next to the records. Every field has a default, so a partial or
/// missing file is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// IANA name of the zone used to decide what "today" is.
    pub timezone: String,
    /// Number of days analytics look back.
    pub lookback_days: u32,
    /// How far from its time a reminder may still fire, in minutes.
    pub tolerance_minutes: u32,
    /// How often the reminder daemon wakes up, in seconds.
    pub tick_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIME_ZONE.into(),
            lookback_days: 90,
            tolerance_minutes: 2,
            tick_seconds: 60,
        }
    }
}

impl Settings {
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE)
    }

    pub fn load(dir: &Path) -> Result<Settings> {
        let path = Self::path(dir);
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse settings in {path:?}")),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings in {path:?}, using defaults");
                Ok(Settings::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {path:?}")),
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::path(dir);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {path:?}"))
    }

    /// Configured zone, UTC when the name is unknown.
    pub fn zone(&self) -> Zone {
        Zone::resolve(&self.timezone)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_seconds.max(1))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::Settings;

    #[test]
    fn missing_file_gives_defaults() -> Result<()> {
        let dir = tempdir()?;
        let settings = Settings::load(dir.path())?;
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.zone().name(), "Africa/Tunis");
        Ok(())
    }

    #[test]
    fn partial_file_keeps_other_defaults() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(Settings::path(dir.path()), r#"{"timezone": "Europe/Kyiv"}"#)?;
        let settings = Settings::load(dir.path())?;
        assert_eq!(settings.timezone, "Europe/Kyiv");
        assert_eq!(settings.lookback_days, 90);
        Ok(())
    }

    #[test]
    fn save_then_load() -> Result<()> {
        let dir = tempdir()?;
        let settings = Settings {
            tolerance_minutes: 5,
            ..Settings::default()
        };
        settings.save(dir.path())?;
        assert_eq!(Settings::load(dir.path())?, settings);
        Ok(())
    }
}
