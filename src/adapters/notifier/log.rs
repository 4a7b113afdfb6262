use crate::ports::notifier::{Error, Notification, NotifierPort};

/// Notifier that writes to the log instead of dispatching anywhere.
#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl NotifierPort for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), Error> {
        tracing::info!(
            account_id = %notification.account_id,
            message = %notification.message,
            "notification"
        );
        Ok(())
    }
}
