use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

/// Watches reminders and prints them when they are due.
#[derive(Parser)]
#[command(version, about)]
pub struct DaemonArgs {
    /// Application directory, defaults to the state directory of the user.
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Overrides the configured time zone.
    #[arg(long)]
    pub tz: Option<String>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}
