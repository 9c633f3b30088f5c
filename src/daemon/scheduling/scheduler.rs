use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use crate::{
    daemon::notification::ReminderNotification,
    storage::entities::ReminderEntity,
    tracking::{
        date::{CalendarDate, TimeOfDay},
        zone::Zone,
    },
    utils::clock::Clock,
};

use super::{fired::FiredSet, source::ReminderSource};

pub struct ReminderScheduler {
    next: mpsc::Sender<ReminderNotification>,
    source: Box<dyn ReminderSource>,
    shutdown: CancellationToken,
    zone: Zone,
    tolerance_minutes: u32,
    tick_frequency: Duration,
    time_provider: Box<dyn Clock>,
    fired: FiredSet,
}

impl ReminderScheduler {
    pub fn new(
        next: mpsc::Sender<ReminderNotification>,
        source: Box<dyn ReminderSource>,
        shutdown: CancellationToken,
        zone: Zone,
        tolerance_minutes: u32,
        tick_frequency: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            source,
            shutdown,
            zone,
            tolerance_minutes,
            tick_frequency,
            time_provider,
            fired: FiredSet::default(),
        }
    }

    /// Runs one check. Returns the number of notifications sent. Fails only when the processing
    /// side is gone, storage errors are logged and retried on the next tick.
    pub async fn tick(&mut self) -> Result<usize> {
        let now = self.time_provider.time();
        let today = self.zone.today(now);
        let time = self.zone.time_of_day(now);
        self.fired.roll_to(today);

        let reminders = match self.source.active_reminders().await {
            Ok(v) => v,
            Err(e) => {
                error!("Failed to load reminders {e:?}");
                return Ok(0);
            }
        };
        debug!("Checking {} reminders at {today} {time}", reminders.len());

        let mut sent = 0;
        for mut reminder in reminders {
            if let Some(notification) = self.due_notification(&reminder, today, time, now) {
                let span = info_span!("Sending reminder");
                self.next
                    .send(notification)
                    .instrument(span)
                    .await
                    .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                self.fired.insert(reminder.id);
                sent += 1;
                info!("Fired reminder {}", reminder.id);
            }

            if reminder.schedule.refresh(&self.zone, now) {
                debug!(
                    "Next occurrence of {} is {:?}",
                    reminder.id, reminder.schedule.next_occurrence
                );
                match self
                    .source
                    .update_next_occurrence(reminder.id, reminder.schedule.next_occurrence)
                    .await
                {
                    Ok(true) => (),
                    Ok(false) => debug!("Reminder {} was removed meanwhile", reminder.id),
                    Err(e) => error!("Failed to save next occurrence of {} {e:?}", reminder.id),
                }
            }
        }
        Ok(sent)
    }

    fn due_notification(
        &self,
        reminder: &ReminderEntity,
        today: CalendarDate,
        time: TimeOfDay,
        now: DateTime<Utc>,
    ) -> Option<ReminderNotification> {
        let remind_at = reminder.schedule.remind_at?;
        let due = reminder.schedule.is_due_on(today, &self.zone)
            && remind_at.is_within(time, self.tolerance_minutes)
            && !self.fired.contains(reminder.id);
        due.then(|| ReminderNotification {
            reminder_id: reminder.id,
            text: reminder.text.clone(),
            description: reminder.description.clone(),
            date: today,
            remind_at,
            fired_at: now,
        })
    }

    /// Executes the scheduler event loop.
    pub async fn run(mut self) -> Result<()> {
        let mut tick_point = self.time_provider.instant();
        loop {
            tick_point += self.tick_frequency;

            self.tick().await?;

            tokio::select! {
                // Returning drops the sender, which stops the processing module.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(tick_point) => ()
            }
        }
    }
}
