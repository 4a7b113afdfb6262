use std::{borrow::Cow, sync::Arc};

use crate::{
    config::RewardConfig,
    ports::{
        geo, identity, ledger,
        notifier::{Notification, NotifierPort},
        offers, requests, schedules,
    },
};

pub mod accept_offer;
pub mod assign_truck;
pub mod confirm_pickup;
pub mod create_request;
pub mod delete_request;
pub mod list_offers;
pub mod list_open_requests;
pub mod mark_completed;
pub mod report_missed;
pub mod request_conversion;
pub mod resolve_conversion;
pub mod submit_offer;

/// The engine behind every marketplace operation.
///
/// `D` is the storage adapter (all four store ports), `I`/`G`/`N` the
/// identity, geo, and notifier collaborators. Each operation is a
/// [`tower::Service`] implementation on this type, one per submodule.
pub struct DomainLogic<D, I, G, N> {
    database: Arc<D>,
    identity: Arc<I>,
    geo: Arc<G>,
    notifier: Arc<N>,
    rewards: RewardConfig,
}

impl<D, I, G, N> DomainLogic<D, I, G, N> {
    pub fn new(database: D, identity: I, geo: G, notifier: N, rewards: RewardConfig) -> Self {
        Self {
            database: Arc::new(database),
            identity: Arc::new(identity),
            geo: Arc::new(geo),
            notifier: Arc::new(notifier),
            rewards,
        }
    }
}

impl<D, I, G, N> Clone for DomainLogic<D, I, G, N> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            identity: self.identity.clone(),
            geo: self.geo.clone(),
            notifier: self.notifier.clone(),
            rewards: self.rewards,
        }
    }
}

/// Caller-recoverable error taxonomy, surfaced verbatim at the API boundary.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed, missing, or out-of-range input.
    #[error("invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),

    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(Cow<'static, str>),

    /// The authenticated actor is not the entity's authorized owner.
    #[error("forbidden: {0}")]
    Forbidden(Cow<'static, str>),

    /// State-machine violation: duplicate offer, already-accepted request,
    /// already-confirmed schedule, insufficient balance, resolved conversion.
    #[error("conflict: {0}")]
    Conflict(Cow<'static, str>),

    /// Unexpected storage or collaborator failure. Atomic port methods
    /// guarantee no partial state was left behind.
    #[error("unavailable: {0:?}")]
    Unavailable(Box<dyn std::error::Error + Send + Sync>),
}

impl From<requests::Error> for Error {
    fn from(err: requests::Error) -> Self {
        match err {
            requests::Error::RequestNotFound(_) => Self::NotFound(err.to_string().into()),
            requests::Error::NotRequestOwner { .. } => Self::Forbidden(err.to_string().into()),
            requests::Error::RequestCommitted(_) => Self::Conflict(err.to_string().into()),
            requests::Error::Adapter(err) => Self::Unavailable(err),
        }
    }
}

impl From<offers::Error> for Error {
    fn from(err: offers::Error) -> Self {
        match err {
            offers::Error::RequestNotFound(_) | offers::Error::OfferNotFound(_) => {
                Self::NotFound(err.to_string().into())
            }
            offers::Error::NotRequestOwner { .. } => Self::Forbidden(err.to_string().into()),
            offers::Error::RequestClosed { .. } | offers::Error::DuplicateOffer { .. } => {
                Self::Conflict(err.to_string().into())
            }
            offers::Error::Adapter(err) => Self::Unavailable(err),
        }
    }
}

impl From<schedules::Error> for Error {
    fn from(err: schedules::Error) -> Self {
        match err {
            schedules::Error::ScheduleNotFound(_) => Self::NotFound(err.to_string().into()),
            schedules::Error::NotScheduleActor { .. } => Self::Forbidden(err.to_string().into()),
            schedules::Error::InvalidTransition { .. }
            | schedules::Error::DuplicateReport(_)
            | schedules::Error::DuplicateCredit(_) => Self::Conflict(err.to_string().into()),
            schedules::Error::Adapter(err) => Self::Unavailable(err),
        }
    }
}

impl From<ledger::Error> for Error {
    fn from(err: ledger::Error) -> Self {
        match err {
            ledger::Error::ConversionNotFound(_) => Self::NotFound(err.to_string().into()),
            ledger::Error::DuplicateReference { .. }
            | ledger::Error::NegativeBalance { .. }
            | ledger::Error::InsufficientBalance { .. }
            | ledger::Error::ConversionResolved { .. } => Self::Conflict(err.to_string().into()),
            ledger::Error::Adapter(err) => Self::Unavailable(err),
        }
    }
}

impl From<identity::Error> for Error {
    fn from(err: identity::Error) -> Self {
        match err {
            // An actor the identity service does not know is malformed input,
            // not a missing marketplace entity.
            identity::Error::AccountDoesNotExist(_) => {
                Self::InvalidArgument(err.to_string().into())
            }
            identity::Error::Adapter(err) => Self::Unavailable(err),
        }
    }
}

impl From<geo::Error> for Error {
    fn from(err: geo::Error) -> Self {
        match err {
            geo::Error::Adapter(err) => Self::Unavailable(err),
        }
    }
}

/// Fire-and-forget dispatch: failures are logged, never propagated, and the
/// call always happens after the storage transaction.
pub(crate) async fn notify_best_effort<N: NotifierPort>(notifier: &N, notification: Notification) {
    if let Err(err) = notifier.notify(notification).await {
        tracing::warn!(error = ?err, "notification dispatch failed");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::DomainLogic;
    use crate::{
        adapters::{
            database::memory::MemoryStore, geo::passthrough::PassthroughGeo,
            notifier::log::LogNotifier,
        },
        config::RewardConfig,
        domain::{MaterialType, Offer, Schedule, WasteRequest},
        ports::{
            identity::MockIdentityPort,
            offers::{NewOffer, OfferStore},
            requests::{NewRequest, RequestStore},
            schedules::ScheduleStore,
        },
    };
    use std::sync::Arc;
    use uuid::Uuid;

    pub(crate) type TestLogic =
        DomainLogic<MemoryStore, MockIdentityPort, PassthroughGeo, LogNotifier>;

    /// Logic over a shared in-memory store, with collaborators that commands
    /// under test either ignore or may freely hit.
    pub(crate) fn logic(store: &MemoryStore) -> TestLogic {
        DomainLogic {
            database: Arc::new(store.clone()),
            identity: Arc::new(MockIdentityPort::new()),
            geo: Arc::new(PassthroughGeo),
            notifier: Arc::new(LogNotifier),
            rewards: RewardConfig::default(),
        }
    }

    pub(crate) async fn seed_request(store: &MemoryStore, requester_id: Uuid) -> WasteRequest {
        store
            .insert_request(NewRequest {
                requester_id,
                material: MaterialType::Plastic,
                quantity: 10.0,
                unit: "kg".to_string(),
                image_url: None,
            })
            .await
            .unwrap()
    }

    pub(crate) async fn seed_offer(
        store: &MemoryStore,
        request_id: Uuid,
        fulfiller_id: Uuid,
        price: f64,
    ) -> Offer {
        store
            .insert_offer(NewOffer {
                request_id,
                fulfiller_id,
                price,
                pickup_date: None,
            })
            .await
            .unwrap()
    }

    /// Request + offer + acceptance in one go; the schedule is `Scheduled`.
    pub(crate) async fn seed_schedule(
        store: &MemoryStore,
        requester_id: Uuid,
        fulfiller_id: Uuid,
    ) -> Schedule {
        let request = seed_request(store, requester_id).await;
        let offer = seed_offer(store, request.request_id, fulfiller_id, 50.0).await;
        store
            .accept_offer(offer.offer_id, requester_id)
            .await
            .unwrap()
    }

    /// A schedule the provider already marked completed.
    pub(crate) async fn seed_completed_schedule(
        store: &MemoryStore,
        requester_id: Uuid,
        fulfiller_id: Uuid,
    ) -> Schedule {
        let schedule = seed_schedule(store, requester_id, fulfiller_id).await;
        store
            .mark_completed(schedule.schedule_id, fulfiller_id)
            .await
            .unwrap()
    }
}
