pub mod calendar;
pub mod config;
pub mod counter;
pub mod output;
pub mod reminder;
pub mod session;
pub mod stats;
pub mod task;

use std::path::PathBuf;

use anyhow::Result;
use calendar::process_calendar_command;
use clap::{Parser, Subcommand};
use config::{process_config_command, ConfigCommand};
use counter::{process_checkin_command, process_counter_command, process_streak_command, CounterCommand};
use reminder::{process_reminder_command, ReminderCommand};
use session::Session;
use stats::process_stats_command;
use task::{process_task_command, TaskCommand};
use tracing::{error, level_filters::LevelFilter};

use crate::{
    daemon::start_daemon,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
        runtime::single_thread_runtime,
    },
};

#[derive(Parser, Debug)]
#[command(name = "daymark", version, long_about = None)]
#[command(about = "Habits, tasks and reminders in your terminal", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default $XDG_STATE_HOME/daymark or $HOME/.local/state/daymark"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Time zone for this run, for example Europe/Kyiv. Overrides the configured one"
    )]
    tz: Option<String>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Manage counters, habits that are checked in once a day")]
    Counter {
        #[command(subcommand)]
        command: CounterCommand,
    },
    #[command(about = "Check in a counter. Checking in twice on a day counts once")]
    Checkin {
        #[arg(help = "Counter name or id")]
        counter: String,
        #[arg(long, help = "Day of the check-in, \"2024-03-15\" or \"yesterday\". Today by default")]
        date: Option<String>,
    },
    #[command(about = "Show streaks and progress of a counter")]
    Streak {
        #[arg(help = "Counter name or id")]
        counter: String,
    },
    #[command(about = "Manage tasks planned for a day")]
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    #[command(about = "Manage reminders")]
    Reminder {
        #[command(subcommand)]
        command: ReminderCommand,
    },
    #[command(about = "Task completion and counter statistics")]
    Stats {
        #[arg(long, help = "Number of days to look back. Configured lookback by default")]
        days: Option<u32>,
    },
    #[command(about = "Month heat map of task completion")]
    Calendar {
        #[arg(long, help = "Month to show as YYYY-MM. Current month by default")]
        month: Option<String>,
    },
    #[command(about = "Show or change settings")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    #[command(about = "Watch reminders in the current console until Ctrl-C")]
    Watch,
}

/// Parses arguments, sets up logging and runs the command on a single threaded runtime.
pub fn run_cli() -> Result<()> {
    let args = Args::parse();
    let dir = match &args.dir {
        Some(dir) => ensure_dir(dir.clone())?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;

    single_thread_runtime()?.block_on(async move {
        let session = Session::open(&dir, args.tz.as_deref(), Box::new(DefaultClock))?;
        process_command(args.commands, &session)
            .await
            .inspect_err(|e| error!("Command failed {e:?}"))
    })
}

async fn process_command(command: Commands, session: &Session) -> Result<()> {
    let output = match command {
        Commands::Counter { command } => process_counter_command(command, session).await?,
        Commands::Checkin { counter, date } => {
            process_checkin_command(&counter, date.as_deref(), session).await?
        }
        Commands::Streak { counter } => process_streak_command(&counter, session).await?,
        Commands::Task { command } => process_task_command(command, session).await?,
        Commands::Reminder { command } => process_reminder_command(command, session).await?,
        Commands::Stats { days } => process_stats_command(days, session).await?,
        Commands::Calendar { month } => process_calendar_command(month.as_deref(), session).await?,
        Commands::Config { command } => process_config_command(command, session)?,
        Commands::Watch => {
            start_daemon(&session.dir, &session.settings, session.zone).await?;
            return Ok(());
        }
    };
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
