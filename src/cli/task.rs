use anyhow::Result;
use clap::{CommandFactory, Subcommand};
use tracing::info;

use crate::{
    storage::{
        entities::TaskEntity,
        record_storage::{DateWindow, RecordStorage},
    },
    tracking::aggregate::completion_pct,
};

use super::{
    output::{checkbox, short_id},
    session::Session,
    Args,
};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    #[command(about = "Plan a task")]
    Add {
        title: String,
        #[arg(long, help = "Day of the task, \"2024-03-15\" or \"tomorrow\". Today by default")]
        date: Option<String>,
    },
    #[command(about = "Mark a task as done")]
    Done {
        #[arg(help = "Task id or its prefix")]
        id: String,
        #[arg(long, help = "Day the task is planned for. Today by default")]
        date: Option<String>,
        #[arg(long, help = "Mark the task as not done instead")]
        undo: bool,
    },
    #[command(about = "List tasks of a day")]
    List {
        #[arg(long, help = "Day to list. Today by default")]
        date: Option<String>,
    },
    #[command(about = "Remove a task planned by mistake")]
    Remove {
        #[arg(help = "Task id or its prefix")]
        id: String,
        #[arg(long, help = "Day the task is planned for. Today by default")]
        date: Option<String>,
    },
}

pub async fn process_task_command(command: TaskCommand, session: &Session) -> Result<String> {
    match command {
        TaskCommand::Add { title, date } => {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(Args::command()
                    .error(clap::error::ErrorKind::ValueValidation, "Task title can't be empty")
                    .into());
            }
            let date = session.day(date.as_deref())?;
            let task = TaskEntity::new(title, date, session.now());
            session.store.tasks.write(task.clone()).await?;
            info!("Created task {}", task.id);
            Ok(format!("Planned {} for {date} {}", task.title, short_id(task.id)))
        }
        TaskCommand::Done { id, date, undo } => {
            let date = session.day(date.as_deref())?;
            let task = session.store.find_task(&id, date).await?;
            let task = task.with_completed(!undo, session.now());
            session.store.tasks.write(task.clone()).await?;
            Ok(format!("{} {}", checkbox(task.completed), task.title))
        }
        TaskCommand::List { date } => {
            let date = session.day(date.as_deref())?;
            let tasks = session.store.planned_tasks(DateWindow::day(date)).await?;
            if tasks.is_empty() {
                return Ok(format!("Nothing planned for {date}"));
            }
            let done = tasks.iter().filter(|v| v.completed).count() as u32;
            let mut lines = tasks
                .iter()
                .map(|v| format!("{} {}\t{}", checkbox(v.completed), short_id(v.id), v.title))
                .collect::<Vec<_>>();
            lines.push(format!(
                "{done}/{} done on {date} ({}%)",
                tasks.len(),
                completion_pct(tasks.len() as u32, done)
            ));
            Ok(lines.join("\n"))
        }
        TaskCommand::Remove { id, date } => {
            let date = session.day(date.as_deref())?;
            let task = session.store.find_task(&id, date).await?;
            let title = task.title.clone();
            session
                .store
                .tasks
                .write(TaskEntity {
                    removed: true,
                    ..task
                })
                .await?;
            info!("Removed task {id}");
            Ok(format!("Removed {title}"))
        }
    }
}
