use anyhow::Result;

use crate::daemon::notification::ReminderNotification;

/// Delivers notifications somewhere. The console is the only target for now.
pub trait NotificationProcessor {
    fn process_next(
        &mut self,
        notification: ReminderNotification,
    ) -> impl std::future::Future<Output = Result<()>>;

    fn finalize(&mut self) -> impl std::future::Future<Output = Result<()>>;
}
