use uuid::Uuid;

use crate::domain::{MaterialType, WasteRequest};

/// Fields for a request about to be created; the store assigns the id,
/// status, and timestamp.
#[derive(Clone, Debug)]
pub struct NewRequest {
    pub requester_id: Uuid,
    pub material: MaterialType,
    pub quantity: f64,
    pub unit: String,
    pub image_url: Option<String>,
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait RequestStore {
    async fn insert_request(&self, new: NewRequest) -> Result<WasteRequest, Error>;
    async fn get_request(&self, request_id: Uuid) -> Result<WasteRequest, Error>;
    /// All open requests except those owned by `exclude_requester`.
    async fn list_open_requests(&self, exclude_requester: Uuid)
        -> Result<Vec<WasteRequest>, Error>;
    /// Marks the request deleted iff the caller owns it and no schedule has
    /// been created from it. Ownership and state are checked in the same
    /// transaction as the write.
    async fn delete_request(&self, request_id: Uuid, requester_id: Uuid) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request {0} does not exist")]
    RequestNotFound(Uuid),

    #[error("account {actor_id} does not own request {request_id}")]
    NotRequestOwner { request_id: Uuid, actor_id: Uuid },

    /// The request already produced a schedule and can no longer be deleted.
    #[error("request {0} has an accepted offer with a schedule")]
    RequestCommitted(Uuid),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
