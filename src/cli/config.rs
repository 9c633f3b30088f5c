use anyhow::Result;
use clap::{CommandFactory, Subcommand};
use tracing::info;

use crate::{settings::Settings, tracking::zone::Zone};

use super::{session::Session, Args};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    #[command(about = "Print current settings")]
    Show,
    #[command(about = "Change the zone used to decide what today is")]
    SetTimezone {
        #[arg(help = "IANA zone name, for example Africa/Tunis")]
        zone: String,
    },
}

pub fn process_config_command(command: ConfigCommand, session: &Session) -> Result<String> {
    match command {
        ConfigCommand::Show => Ok(format!(
            "directory\t{}\ntimezone\t{}\nin use\t{}\nlookback days\t{}\ntolerance minutes\t{}\ntick seconds\t{}",
            session.dir.display(),
            session.settings.timezone,
            session.zone.name(),
            session.settings.lookback_days,
            session.settings.tolerance_minutes,
            session.settings.tick_seconds,
        )),
        ConfigCommand::SetTimezone { zone } => {
            let zone = Zone::parse(&zone).map_err(|e| {
                Args::command().error(clap::error::ErrorKind::ValueValidation, e.to_string())
            })?;
            let settings = Settings {
                timezone: zone.name().into(),
                ..session.settings.clone()
            };
            settings.save(&session.dir)?;
            info!("Time zone set to {}", zone.name());
            Ok(format!("Time zone set to {}", zone.name()))
        }
    }
}
