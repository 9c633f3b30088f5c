use anyhow::Result;
use clap::{CommandFactory, Subcommand};
use tracing::info;

use crate::{
    storage::entities::CounterEntity,
    tracking::{
        date::CalendarDate,
        progress::{checkins_this_week, counter_progress, counter_stats, CounterTarget},
        streak::CheckinSet,
    },
};

use super::{
    output::{progress_bar, short_id},
    session::Session,
    Args,
};

#[derive(Subcommand, Debug)]
pub enum CounterCommand {
    #[command(about = "Create a counter")]
    Add {
        name: String,
        #[arg(long, help = "Check-ins needed per week. Without it the counter is daily")]
        weekly: Option<u32>,
        #[arg(long, help = "Emoji or short text shown before the name")]
        icon: Option<String>,
    },
    #[command(about = "List counters with their progress for today")]
    List,
    #[command(about = "Hide a counter. Its check-ins are kept")]
    Archive {
        #[arg(help = "Counter name or id")]
        counter: String,
    },
}

pub async fn process_counter_command(command: CounterCommand, session: &Session) -> Result<String> {
    match command {
        CounterCommand::Add { name, weekly, icon } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(Args::command()
                    .error(
                        clap::error::ErrorKind::ValueValidation,
                        "Counter name can't be empty",
                    )
                    .into());
            }
            let target = weekly.map_or(CounterTarget::Daily, |value| CounterTarget::Weekly { value });
            let counter = CounterEntity::new(name, icon, target, session.now());
            session.store.counters.write(counter.clone()).await?;
            info!("Created counter {}", counter.id);
            Ok(format!("Created {} {}", display_name(&counter), short_id(counter.id)))
        }
        CounterCommand::List => list_counters(session).await,
        CounterCommand::Archive { counter } => {
            let counter = session.store.find_counter(&counter).await?;
            let name = display_name(&counter);
            session
                .store
                .counters
                .write(CounterEntity {
                    archived: true,
                    ..counter
                })
                .await?;
            Ok(format!("Archived {name}"))
        }
    }
}

async fn list_counters(session: &Session) -> Result<String> {
    let counters = session.store.active_counters().await?;
    if counters.is_empty() {
        return Ok("No counters yet, create one with `daymark counter add`".into());
    }
    let today = session.today();
    let mut sets = session.store.checkin_sets().await?;
    let lines = counters
        .iter()
        .map(|counter| {
            let checkins = sets.remove(&counter.id).unwrap_or_default();
            format!(
                "{}\t{}\t{}\t{}",
                short_id(counter.id),
                progress_bar(counter_progress(counter.target, &checkins, today)),
                describe_target(counter.target, &checkins, today),
                display_name(counter),
            )
        })
        .collect::<Vec<_>>();
    Ok(lines.join("\n"))
}

pub async fn process_checkin_command(
    counter: &str,
    date: Option<&str>,
    session: &Session,
) -> Result<String> {
    let counter = session.store.find_counter(counter).await?;
    let date = session.day(date)?;
    session.store.check_in(&counter, date, session.now()).await?;
    let checkins = session.store.checkin_set(counter.id).await?;
    Ok(format!(
        "Checked in {} on {date}, streak {}",
        display_name(&counter),
        checkins.current_streak(session.today())
    ))
}

pub async fn process_streak_command(counter: &str, session: &Session) -> Result<String> {
    let counter = session.store.find_counter(counter).await?;
    let checkins = session.store.checkin_set(counter.id).await?;
    let today = session.today();
    let stats = counter_stats(&checkins, today);
    Ok([
        display_name(&counter),
        format!("current streak\t{}", stats.current_streak),
        format!("longest streak\t{}", stats.longest_streak),
        format!(
            "progress\t{} {}",
            progress_bar(counter_progress(counter.target, &checkins, today)),
            describe_target(counter.target, &checkins, today)
        ),
        format!(
            "check-ins\t{} total, {} in 30 days, {} in 7 days",
            stats.total_checkins, stats.last_30_checkins, stats.last_7_checkins
        ),
        format!(
            "last check-in\t{}",
            checkins.last().map_or_else(|| "never".into(), |v| v.to_string())
        ),
    ]
    .join("\n"))
}

pub fn display_name(counter: &CounterEntity) -> String {
    match &counter.icon {
        Some(icon) => format!("{icon} {}", counter.name),
        None => counter.name.clone(),
    }
}

fn describe_target(target: CounterTarget, checkins: &CheckinSet, today: CalendarDate) -> String {
    match target {
        CounterTarget::Daily if checkins.contains(today) => "done today".into(),
        CounterTarget::Daily => "not yet today".into(),
        CounterTarget::Weekly { value } => {
            format!("{}/{value} this week", checkins_this_week(checkins, today))
        }
    }
}
