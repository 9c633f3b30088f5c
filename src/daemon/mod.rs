//! Reminder daemon. A [scheduling::scheduler::ReminderScheduler] checks reminders every tick and
//! sends the due ones through a channel to a [processing::NotificationModule].

use std::path::Path;

use anyhow::Result;
use processing::{console::ConsoleNotifier, NotificationModule};
use scheduling::{scheduler::ReminderScheduler, source::ReminderSource};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    settings::Settings,
    storage::Store,
    tracking::zone::Zone,
    utils::clock::{Clock, DefaultClock},
};

use notification::ReminderNotification;

pub mod args;
pub mod notification;
pub mod processing;
pub mod scheduling;
pub mod shutdown;

/// Represents the starting point for the daemon. Runs until Ctrl-C.
pub async fn start_daemon(dir: &Path, settings: &Settings, zone: Zone) -> Result<()> {
    let (sender, receiver) = mpsc::channel::<ReminderNotification>(10);
    let store = Store::open(&dir.join("records"))?;

    let shutdown_token = CancellationToken::new();

    let scheduler = create_scheduler(
        sender,
        store,
        &shutdown_token,
        settings,
        zone,
        DefaultClock,
    );
    let processor = NotificationModule::new(receiver, ConsoleNotifier::default());

    info!("Watching reminders in {}", zone.name());
    let (_, scheduling_result, processing_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        async {
            let result = scheduler.run().await;
            // Stops waiting for Ctrl-C when the scheduler died on its own
            shutdown_token.cancel();
            result
        },
        processor.run(),
    );

    if let Err(scheduling_result) = scheduling_result {
        error!("Scheduling module got an error {:?}", scheduling_result);
    }

    if let Err(processing_result) = processing_result {
        error!("Processing module got an error {:?}", processing_result);
    }

    Ok(())
}

fn create_scheduler(
    sender: mpsc::Sender<ReminderNotification>,
    source: impl ReminderSource + 'static,
    shutdown_token: &CancellationToken,
    settings: &Settings,
    zone: Zone,
    clock: impl Clock,
) -> ReminderScheduler {
    ReminderScheduler::new(
        sender,
        Box::new(source),
        shutdown_token.clone(),
        zone,
        settings.tolerance_minutes,
        settings.tick(),
        Box::new(clock),
    )
}

#[cfg(test)]
mod daemon_tests {
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use crate::{
        daemon::{create_scheduler, notification::ReminderNotification},
        settings::Settings,
        storage::{entities::ReminderEntity, Store},
        tracking::{recurrence::RecurrenceRule, zone::Zone},
        utils::{clock::ManualClock, logging::TEST_LOGGING},
    };

    /// Runs the scheduler against a real store: the reminder fires once and its cached next
    /// occurrence is written back.
    #[tokio::test]
    async fn smoke_test_daemon() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let settings = Settings::default();
        let zone = settings.zone();
        let created = Utc.with_ymd_and_hms(2024, 3, 4, 6, 0, 0).unwrap();
        let reminder = ReminderEntity::new(
            "water the plants".into(),
            Some("the big ones too".into()),
            RecurrenceRule::Daily,
            Some("08:30".parse()?),
            &zone,
            created,
        );
        Store::open(&dir.path().join("records"))?
            .reminders
            .write(reminder.clone())
            .await?;

        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 4, 7, 31, 0).unwrap());
        let (sender, mut receiver) = mpsc::channel::<ReminderNotification>(10);
        let mut scheduler = create_scheduler(
            sender,
            Store::open(&dir.path().join("records"))?,
            &CancellationToken::new(),
            &settings,
            zone,
            clock.clone(),
        );

        assert_eq!(scheduler.tick().await?, 1);
        clock.advance(chrono::Duration::minutes(1));
        assert_eq!(scheduler.tick().await?, 0);

        let notification = receiver.try_recv()?;
        assert_eq!(notification.text, "water the plants");
        assert_eq!(notification.description.as_deref(), Some("the big ones too"));
        assert!(receiver.try_recv().is_err());

        let stored = Store::open(&dir.path().join("records"))?
            .active_reminders()
            .await?;
        assert_eq!(
            stored[0].schedule.next_occurrence,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 7, 30, 0).unwrap())
        );
        assert_eq!(zone, Zone::resolve("Africa/Tunis"));
        Ok(())
    }
}
