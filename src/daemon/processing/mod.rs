use anyhow::Result;
use module::NotificationProcessor;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info};

use super::notification::ReminderNotification;

pub mod console;
pub mod module;

/// Receives fired reminders and hands them to a [NotificationProcessor]. Stops once the scheduler
/// drops its sender.
pub struct NotificationModule<Processor> {
    receiver: Receiver<ReminderNotification>,
    processor: Processor,
}

impl<P: NotificationProcessor> NotificationModule<P> {
    pub fn new(receiver: Receiver<ReminderNotification>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(notification) = self.receiver.recv().await {
            debug!("Processing notification {:?}", notification);
            match self.processor.process_next(notification.clone()).await {
                Ok(_) => {
                    info!("Delivered reminder {}", notification.reminder_id)
                }
                Err(e) => {
                    error!("Error delivering {:?}: {e:?}", notification)
                }
            }
        }

        let result = self.processor.finalize().await;
        self.receiver.close();
        result
    }
}
