use anyhow::Result;
use ansi_term::{Colour, Style};
use tracing::info;

use crate::daemon::notification::ReminderNotification;

use super::module::NotificationProcessor;

/// Prints reminders to stdout.
#[derive(Default)]
pub struct ConsoleNotifier {
    delivered: usize,
}

impl ConsoleNotifier {
    pub fn format(notification: &ReminderNotification) -> String {
        let mut line = format!(
            "{} {}",
            Colour::Yellow.paint(notification.remind_at.to_string()),
            Style::new().bold().paint(&notification.text)
        );
        if let Some(description) = &notification.description {
            line.push_str(&format!("\n      {description}"));
        }
        line
    }
}

impl NotificationProcessor for ConsoleNotifier {
    async fn process_next(&mut self, notification: ReminderNotification) -> Result<()> {
        println!("{}", Self::format(&notification));
        self.delivered += 1;
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        info!("Delivered {} reminders", self.delivered);
        Ok(())
    }
}
