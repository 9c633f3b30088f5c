use anyhow::Result;
use chrono::Duration;
use clap::Subcommand;
use tracing::info;

use crate::{
    storage::entities::ReminderEntity,
    tracking::{
        date::TimeOfDay,
        recurrence::{upcoming, RecurrenceRule, Weekdays},
        zone::Zone,
    },
};

use super::{output::short_id, session::Session};

const UPCOMING_HOURS: u32 = 24;

#[derive(Subcommand, Debug)]
pub enum ReminderCommand {
    #[command(about = "Create a reminder. Daily unless --once or --weekly is given")]
    Add {
        text: String,
        #[arg(long, help = "Time of day as HH:MM. Without it the reminder never fires")]
        at: Option<TimeOfDay>,
        #[arg(long, conflicts_with = "weekly", help = "Fire only once")]
        once: bool,
        #[arg(
            long,
            help = "Weekdays to fire on, for example \"mon,wed,fri\" or \"1,3,5\" with 0 being Sunday"
        )]
        weekly: Option<Weekdays>,
        #[arg(long)]
        description: Option<String>,
    },
    #[command(about = "List active reminders")]
    List {
        #[arg(long, help = "Only reminders due today")]
        today: bool,
    },
    #[command(about = "Reminders firing soon, soonest first")]
    Upcoming {
        #[arg(long, default_value_t = UPCOMING_HOURS, help = "How many hours ahead to look")]
        hours: u32,
    },
    #[command(about = "Remove a reminder")]
    Remove {
        #[arg(help = "Reminder id or its prefix")]
        id: String,
    },
}

pub async fn process_reminder_command(command: ReminderCommand, session: &Session) -> Result<String> {
    match command {
        ReminderCommand::Add {
            text,
            at,
            once,
            weekly,
            description,
        } => {
            let rule = match (once, weekly) {
                (true, _) => RecurrenceRule::Once,
                (false, Some(weekdays)) => RecurrenceRule::Weekly { weekdays },
                (false, None) => RecurrenceRule::Daily,
            };
            let reminder = ReminderEntity::new(text, description, rule, at, &session.zone, session.now());
            session.store.reminders.write(reminder.clone()).await?;
            info!("Created reminder {}", reminder.id);
            Ok(format!(
                "Created {} {}",
                describe(&reminder, &session.zone),
                short_id(reminder.id)
            ))
        }
        ReminderCommand::List { today } => {
            let mut reminders = session.store.active_reminders().await?;
            if today {
                let date = session.today();
                reminders.retain(|v| v.schedule.is_due_on(date, &session.zone));
            }
            refresh_all(&mut reminders, session);
            reminders.sort_by_key(|v| v.schedule.remind_at);
            Ok(render(&reminders.iter().collect::<Vec<_>>(), &session.zone))
        }
        ReminderCommand::Upcoming { hours } => {
            let mut reminders = session.store.active_reminders().await?;
            refresh_all(&mut reminders, session);
            let soon = upcoming(&reminders, session.now(), Duration::hours(hours as i64));
            Ok(render(&soon, &session.zone))
        }
        ReminderCommand::Remove { id } => {
            let reminder = session.store.find_reminder(&id).await?;
            let text = reminder.text.clone();
            session
                .store
                .reminders
                .write(ReminderEntity {
                    active: false,
                    ..reminder
                })
                .await?;
            Ok(format!("Removed {text}"))
        }
    }
}

/// Brings cached next occurrences up to date for display. The daemon owns saving them.
fn refresh_all(reminders: &mut [ReminderEntity], session: &Session) {
    let now = session.now();
    for reminder in reminders {
        reminder.schedule.refresh(&session.zone, now);
    }
}

fn render(reminders: &[&ReminderEntity], zone: &Zone) -> String {
    if reminders.is_empty() {
        return "No reminders".into();
    }
    reminders
        .iter()
        .map(|v| format!("{}\t{}", short_id(v.id), describe(v, zone)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe(reminder: &ReminderEntity, zone: &Zone) -> String {
    let at = reminder
        .schedule
        .remind_at
        .map_or_else(|| "--:--".into(), |v| v.to_string());
    let next = reminder.schedule.next_occurrence.map_or_else(
        || "never".into(),
        |v| zone.local(v).format("%Y-%m-%d %H:%M").to_string(),
    );
    let mut line = format!(
        "{at} {}\t{}\tnext {next}",
        reminder.schedule.rule, reminder.text
    );
    if let Some(description) = &reminder.description {
        line.push_str(&format!("\n\t{description}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::{cli::session::test_session::session, tracking::recurrence::Weekdays};

    use super::{process_reminder_command, ReminderCommand};

    fn add(text: &str, at: &str, once: bool, weekly: Option<&str>) -> ReminderCommand {
        ReminderCommand::Add {
            text: text.into(),
            at: Some(at.parse().unwrap()),
            once,
            weekly: weekly.map(|v| v.parse::<Weekdays>().unwrap()),
            description: None,
        }
    }

    #[tokio::test]
    async fn reminders_list_by_day() -> Result<()> {
        // Wednesday 10:00 in Tunis
        let (_dir, _clock, session) = session()?;
        process_reminder_command(add("standup", "09:30", false, Some("mon,wed")), &session).await?;
        process_reminder_command(add("gym", "18:00", false, Some("tue,thu")), &session).await?;
        let output = process_reminder_command(add("pills", "21:00", false, None), &session).await?;
        assert!(output.contains("next 2024-01-10 21:00"));

        let output = process_reminder_command(ReminderCommand::List { today: true }, &session).await?;
        assert!(output.contains("standup"));
        assert!(output.contains("pills"));
        assert!(!output.contains("gym"));
        // Standup already passed today, the next one is on Monday
        assert!(output.contains("next 2024-01-15 09:30"));
        Ok(())
    }

    #[tokio::test]
    async fn upcoming_is_sorted_and_bounded() -> Result<()> {
        let (_dir, _clock, session) = session()?;
        process_reminder_command(add("late", "22:00", true, None), &session).await?;
        process_reminder_command(add("early", "11:00", true, None), &session).await?;
        process_reminder_command(add("gone", "08:00", true, None), &session).await?;
        process_reminder_command(add("friday", "10:00", false, Some("fri")), &session).await?;

        let output = process_reminder_command(ReminderCommand::Upcoming { hours: 24 }, &session).await?;
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("early"));
        assert!(lines[1].contains("late"));
        Ok(())
    }

    #[tokio::test]
    async fn removed_reminders_disappear() -> Result<()> {
        let (_dir, _clock, session) = session()?;
        process_reminder_command(add("stretch", "12:00", false, None), &session).await?;
        let reminders = session.store.active_reminders().await?;
        let id = reminders[0].id.to_string()[..6].to_string();

        process_reminder_command(ReminderCommand::Remove { id: id.clone() }, &session).await?;
        let output = process_reminder_command(ReminderCommand::List { today: false }, &session).await?;
        assert_eq!(output, "No reminders");
        assert!(process_reminder_command(ReminderCommand::Remove { id }, &session).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn stale_cache_is_refreshed_for_display() -> Result<()> {
        let (_dir, clock, session) = session()?;
        process_reminder_command(add("pills", "11:00", false, None), &session).await?;

        // A day later with no daemon running, the stored next occurrence is in the past
        clock.advance(chrono::Duration::days(1));
        let output = process_reminder_command(ReminderCommand::Upcoming { hours: 24 }, &session).await?;
        assert!(output.contains("pills"));
        assert!(output.contains("next 2024-01-11 11:00"));

        let output = process_reminder_command(ReminderCommand::List { today: false }, &session).await?;
        assert!(output.contains("next 2024-01-11 11:00"));
        Ok(())
    }
}
