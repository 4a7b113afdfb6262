use uuid::Uuid;

use crate::domain::{Offer, RequestStatus, Schedule};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct NewOffer {
    pub request_id: Uuid,
    pub fulfiller_id: Uuid,
    pub price: f64,
    pub pickup_date: Option<DateTime<Utc>>,
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait OfferStore {
    /// Stores a pending offer. The open-request and one-pending-offer-per-
    /// fulfiller guards are applied inside the store's transaction, not by a
    /// prior read.
    async fn insert_offer(&self, new: NewOffer) -> Result<Offer, Error>;
    async fn get_offer(&self, offer_id: Uuid) -> Result<Offer, Error>;
    /// Offers for a request, ordered by submission time ascending.
    async fn list_offers(&self, request_id: Uuid) -> Result<Vec<Offer>, Error>;
    /// The exclusivity boundary: atomically verifies the caller owns the
    /// parent request, transitions the request from `Open` to `OfferAccepted`
    /// iff it is currently `Open`, marks the offer accepted, and creates the
    /// schedule. Under concurrent calls on the same request exactly one
    /// succeeds; the rest get [`Error::RequestClosed`].
    ///
    /// Sibling offers keep their `Pending` status and become inert.
    async fn accept_offer(&self, offer_id: Uuid, requester_id: Uuid) -> Result<Schedule, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request {0} does not exist")]
    RequestNotFound(Uuid),

    #[error("offer {0} does not exist")]
    OfferNotFound(Uuid),

    #[error("account {actor_id} does not own request {request_id}")]
    NotRequestOwner { request_id: Uuid, actor_id: Uuid },

    /// The request no longer takes offers or acceptances.
    #[error("request {request_id} is not open (status: {status:?})")]
    RequestClosed {
        request_id: Uuid,
        status: RequestStatus,
    },

    /// The fulfiller already has a pending offer on this request.
    #[error("fulfiller {fulfiller_id} already offered on request {request_id}")]
    DuplicateOffer {
        request_id: Uuid,
        fulfiller_id: Uuid,
    },

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
