use std::env::args;

use anyhow::Result;
use clap::Parser;
use daymark::{
    daemon::{args::DaemonArgs, start_daemon},
    settings::Settings,
    tracking::zone::Zone,
    utils::{
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, DAEMON_PREFIX},
        runtime::single_thread_runtime,
    },
};
use tracing::error;

fn main() -> Result<()> {
    run_service(args().collect::<Vec<_>>()).inspect_err(|e| error!("Daemon failed {e:?}"))
}

fn run_service(command_args: Vec<String>) -> Result<()> {
    let args = DaemonArgs::parse_from(&command_args);
    let app_dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };
    enable_logging(DAEMON_PREFIX, &app_dir, args.log, args.log_console)?;

    let settings = Settings::load(&app_dir)?;
    let zone = match args.tz.as_deref() {
        Some(tz) => Zone::parse(tz)?,
        None => settings.zone(),
    };
    single_thread_runtime()?.block_on(async move { start_daemon(&app_dir, &settings, zone).await })
}
