use anyhow::Result;

use crate::{
    storage::record_storage::DateWindow,
    tracking::{
        aggregate::{analytics_since, daily_series, summarize},
        progress::counter_stats,
    },
};

use super::{counter::display_name, session::Session};

/// Prints the analytics summary over the last `days` days, the per day completion and check-in
/// numbers of every counter.
pub async fn process_stats_command(days: Option<u32>, session: &Session) -> Result<String> {
    let days = days.unwrap_or(session.settings.lookback_days);
    let today = session.today();
    let records = session
        .store
        .task_records(DateWindow::new(analytics_since(days, today), today))
        .await?;

    let summary = summarize(&records, days, today);
    let mut lines = vec![
        format!("Last {days} days"),
        format!(
            "tasks\t{}/{} done ({}%)",
            summary.completed_tasks, summary.total_tasks, summary.overall_pct
        ),
        format!("active days\t{}", summary.active_days),
        format!(
            "completion streak\t{} (longest {})",
            summary.current_task_streak, summary.longest_task_streak
        ),
    ];

    let series = daily_series(&records, days, today);
    if !series.is_empty() {
        lines.push(String::new());
        lines.extend(
            series
                .iter()
                .map(|v| format!("{}\t{}/{}\t{}%", v.date, v.done, v.total, v.pct)),
        );
    }

    let counters = session.store.active_counters().await?;
    if !counters.is_empty() {
        let mut sets = session.store.checkin_sets().await?;
        lines.push(String::new());
        for counter in counters {
            let stats = counter_stats(&sets.remove(&counter.id).unwrap_or_default(), today);
            lines.push(format!(
                "{}\t{} total\t{} in 30 days\t{} in 7 days\tstreak {} (longest {})",
                display_name(&counter),
                stats.total_checkins,
                stats.last_30_checkins,
                stats.last_7_checkins,
                stats.current_streak,
                stats.longest_streak
            ));
        }
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::{
        cli::{
            counter::{process_checkin_command, process_counter_command, CounterCommand},
            session::test_session::session,
        },
        storage::{entities::TaskEntity, record_storage::RecordStorage},
    };

    use super::process_stats_command;

    #[tokio::test]
    async fn stats_cover_tasks_and_counters() -> Result<()> {
        let (_dir, _clock, session) = session()?;
        let now = session.now();
        for (day, completed) in [
            ("2024-01-08", true),
            ("2024-01-09", true),
            ("2024-01-09", false),
            ("2024-01-10", false),
            ("2023-12-01", true),
        ] {
            let task = TaskEntity::new("task".into(), day.parse()?, now).with_completed(completed, now);
            session.store.tasks.write(task).await?;
        }
        process_counter_command(
            CounterCommand::Add {
                name: "Read".into(),
                weekly: None,
                icon: Some("📖".into()),
            },
            &session,
        )
        .await?;
        process_checkin_command("read", None, &session).await?;

        let output = process_stats_command(Some(7), &session).await?;
        assert!(output.contains("tasks\t2/4 done (50%)"));
        assert!(output.contains("active days\t3"));
        assert!(output.contains("completion streak\t2 (longest 2)"));
        assert!(output.contains("2024-01-09\t1/2\t50%"));
        assert!(!output.contains("2023-12-01"));
        assert!(output.contains("📖 Read\t1 total"));
        Ok(())
    }

    #[tokio::test]
    async fn longest_lookback_reads_whole_history() -> Result<()> {
        let (_dir, _clock, session) = session()?;
        let now = session.now();
        for day in ["2021-05-01", "2024-01-10"] {
            let task = TaskEntity::new("task".into(), day.parse()?, now).with_completed(true, now);
            session.store.tasks.write(task).await?;
        }
        let output = process_stats_command(Some(u32::MAX), &session).await?;
        assert!(output.contains("tasks\t2/2 done (100%)"));
        assert!(output.contains("2021-05-01\t1/1\t100%"));
        Ok(())
    }
}
