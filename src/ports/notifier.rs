use uuid::Uuid;

/// Outbound notification collaborator. Dispatch is fire-and-forget: commands
/// call it after their storage transaction and log failures instead of
/// propagating them.
#[mockall::automock]
#[async_trait::async_trait]
pub trait NotifierPort {
    async fn notify(&self, notification: Notification) -> Result<(), Error>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub account_id: Uuid,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
