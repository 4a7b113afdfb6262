use uuid::Uuid;

#[mockall::automock]
#[async_trait::async_trait]
pub trait IdentityPort {
    async fn get_account(&self, account_id: Uuid) -> Result<Account, Error>;
}

pub struct Account {
    pub account_id: Uuid,
    pub role: AccountRole,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountRole {
    Requester,
    Fulfiller,
    Admin,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain-level error when an account does not exist
    #[error("account {0} does not exist")]
    AccountDoesNotExist(Uuid),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
