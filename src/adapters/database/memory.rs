use crate::{
    domain::{
        balance_of, ConversionRequest, ConversionStatus, EntryReason, LedgerEntry,
        MissedPickupReport, Offer, OfferStatus, RequestStatus, Schedule, ScheduleStatus,
        WasteRequest,
    },
    ports::{
        ledger::{self, ConversionDecision, ConversionResolution, LedgerStore, NewEntry},
        offers::{self, NewOffer, OfferStore},
        requests::{self, NewRequest, RequestStore},
        schedules::{self, ScheduleStore},
    },
};
use chrono::Utc;
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, PoisonError},
};
use uuid::Uuid;

/// In-process store backing all four storage ports.
///
/// Everything lives behind one mutex, which is the transaction boundary:
/// every port method takes the lock once, checks its guards, and applies its
/// writes before releasing, so no partial transition is ever observable and
/// conditional updates (accept, confirm) behave as compare-and-swap.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Stores>>,
}

#[derive(Debug, Default)]
struct Stores {
    requests: HashMap<Uuid, WasteRequest>,
    offers: HashMap<Uuid, Offer>,
    schedules: HashMap<Uuid, Schedule>,
    /// Keyed by schedule id; the map key enforces one report per schedule.
    reports: HashMap<Uuid, MissedPickupReport>,
    entries: Vec<LedgerEntry>,
    /// Uniqueness index over `(reason, ref_id)`, checked at insert time.
    entry_keys: HashSet<(EntryReason, Uuid)>,
    conversions: HashMap<Uuid, ConversionRequest>,
}

impl Stores {
    fn balance(&self, account_id: Uuid) -> i64 {
        balance_of(self.entries.iter().filter(|e| e.account_id == account_id))
    }

    /// Appends an entry, enforcing the idempotence key and the non-negative
    /// balance invariant. Callers hold the lock.
    fn append(&mut self, new: NewEntry) -> Result<LedgerEntry, ledger::Error> {
        let key = (new.reason, new.ref_id);
        if self.entry_keys.contains(&key) {
            return Err(ledger::Error::DuplicateReference {
                reason: new.reason,
                ref_id: new.ref_id,
            });
        }
        let current = self.balance(new.account_id);
        if current + (new.delta as i64) < 0 {
            return Err(ledger::Error::NegativeBalance {
                account_id: new.account_id,
                current,
                delta: new.delta,
            });
        }

        let entry = LedgerEntry {
            entry_id: Uuid::new_v4(),
            account_id: new.account_id,
            delta: new.delta,
            reason: new.reason,
            ref_id: new.ref_id,
            created_at: Utc::now(),
        };
        self.entry_keys.insert(key);
        self.entries.push(entry.clone());
        Ok(entry)
    }
}

#[async_trait::async_trait]
impl RequestStore for MemoryStore {
    async fn insert_request(&self, new: NewRequest) -> Result<WasteRequest, requests::Error> {
        let request = WasteRequest {
            request_id: Uuid::new_v4(),
            requester_id: new.requester_id,
            material: new.material,
            quantity: new.quantity,
            unit: new.unit,
            image_url: new.image_url,
            status: RequestStatus::Open,
            created_at: Utc::now(),
        };
        self.inner
            .lock()?
            .requests
            .insert(request.request_id, request.clone());

        Ok(request)
    }

    async fn get_request(&self, request_id: Uuid) -> Result<WasteRequest, requests::Error> {
        self.inner
            .lock()?
            .requests
            .get(&request_id)
            .filter(|r| r.status != RequestStatus::Deleted)
            .cloned()
            .ok_or(requests::Error::RequestNotFound(request_id))
    }

    async fn list_open_requests(
        &self,
        exclude_requester: Uuid,
    ) -> Result<Vec<WasteRequest>, requests::Error> {
        let mut open: Vec<_> = self
            .inner
            .lock()?
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Open && r.requester_id != exclude_requester)
            .cloned()
            .collect();
        open.sort_by_key(|r| r.created_at);

        Ok(open)
    }

    async fn delete_request(
        &self,
        request_id: Uuid,
        requester_id: Uuid,
    ) -> Result<(), requests::Error> {
        let mut stores = self.inner.lock()?;
        // Any schedule derived from the request means the commitment is
        // irrevocable.
        let committed = stores
            .schedules
            .values()
            .any(|s| s.request_id == request_id);

        let request = stores
            .requests
            .get_mut(&request_id)
            .filter(|r| r.status != RequestStatus::Deleted)
            .ok_or(requests::Error::RequestNotFound(request_id))?;
        if request.requester_id != requester_id {
            return Err(requests::Error::NotRequestOwner {
                request_id,
                actor_id: requester_id,
            });
        }
        if committed {
            return Err(requests::Error::RequestCommitted(request_id));
        }
        request.status = RequestStatus::Deleted;

        Ok(())
    }
}

#[async_trait::async_trait]
impl OfferStore for MemoryStore {
    async fn insert_offer(&self, new: NewOffer) -> Result<Offer, offers::Error> {
        let mut stores = self.inner.lock()?;
        let request = stores
            .requests
            .get(&new.request_id)
            .filter(|r| r.status != RequestStatus::Deleted)
            .ok_or(offers::Error::RequestNotFound(new.request_id))?;
        if request.status != RequestStatus::Open {
            return Err(offers::Error::RequestClosed {
                request_id: new.request_id,
                status: request.status,
            });
        }
        let duplicate = stores
            .offers
            .values()
            .any(|o| o.request_id == new.request_id && o.fulfiller_id == new.fulfiller_id);
        if duplicate {
            return Err(offers::Error::DuplicateOffer {
                request_id: new.request_id,
                fulfiller_id: new.fulfiller_id,
            });
        }

        let offer = Offer {
            offer_id: Uuid::new_v4(),
            request_id: new.request_id,
            fulfiller_id: new.fulfiller_id,
            price: new.price,
            pickup_date: new.pickup_date,
            status: OfferStatus::Pending,
            submitted_at: Utc::now(),
        };
        stores.offers.insert(offer.offer_id, offer.clone());

        Ok(offer)
    }

    async fn get_offer(&self, offer_id: Uuid) -> Result<Offer, offers::Error> {
        self.inner
            .lock()?
            .offers
            .get(&offer_id)
            .cloned()
            .ok_or(offers::Error::OfferNotFound(offer_id))
    }

    async fn list_offers(&self, request_id: Uuid) -> Result<Vec<Offer>, offers::Error> {
        let stores = self.inner.lock()?;
        if !stores
            .requests
            .get(&request_id)
            .is_some_and(|r| r.status != RequestStatus::Deleted)
        {
            return Err(offers::Error::RequestNotFound(request_id));
        }
        let mut offers: Vec<_> = stores
            .offers
            .values()
            .filter(|o| o.request_id == request_id)
            .cloned()
            .collect();
        offers.sort_by_key(|o| o.submitted_at);

        Ok(offers)
    }

    async fn accept_offer(
        &self,
        offer_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Schedule, offers::Error> {
        let mut stores = self.inner.lock()?;
        let stores = &mut *stores;

        let offer = stores
            .offers
            .get(&offer_id)
            .ok_or(offers::Error::OfferNotFound(offer_id))?
            .clone();
        let request = stores
            .requests
            .get_mut(&offer.request_id)
            .filter(|r| r.status != RequestStatus::Deleted)
            .ok_or(offers::Error::RequestNotFound(offer.request_id))?;
        if request.requester_id != requester_id {
            return Err(offers::Error::NotRequestOwner {
                request_id: offer.request_id,
                actor_id: requester_id,
            });
        }
        // Conditional update: only an open request admits acceptance. Under
        // concurrent accepts the first caller through the lock flips the
        // status and every later caller lands here.
        if request.status != RequestStatus::Open {
            return Err(offers::Error::RequestClosed {
                request_id: offer.request_id,
                status: request.status,
            });
        }

        request.status = RequestStatus::OfferAccepted;
        if let Some(offer) = stores.offers.get_mut(&offer_id) {
            offer.status = OfferStatus::Accepted;
        }
        let schedule = Schedule {
            schedule_id: Uuid::new_v4(),
            offer_id,
            request_id: offer.request_id,
            requester_id,
            fulfiller_id: offer.fulfiller_id,
            price: offer.price,
            pickup_date: offer.pickup_date,
            status: ScheduleStatus::Scheduled,
            created_at: Utc::now(),
        };
        stores
            .schedules
            .insert(schedule.schedule_id, schedule.clone());

        Ok(schedule)
    }
}

#[async_trait::async_trait]
impl ScheduleStore for MemoryStore {
    async fn get_schedule(&self, schedule_id: Uuid) -> Result<Schedule, schedules::Error> {
        self.inner
            .lock()?
            .schedules
            .get(&schedule_id)
            .cloned()
            .ok_or(schedules::Error::ScheduleNotFound(schedule_id))
    }

    async fn assign_truck(
        &self,
        schedule_id: Uuid,
        fulfiller_id: Uuid,
    ) -> Result<Schedule, schedules::Error> {
        let mut stores = self.inner.lock()?;
        let schedule = transition(
            &mut stores.schedules,
            schedule_id,
            Actor::Fulfiller(fulfiller_id),
            ScheduleStatus::TruckAssigned,
        )?;

        Ok(schedule)
    }

    async fn mark_completed(
        &self,
        schedule_id: Uuid,
        fulfiller_id: Uuid,
    ) -> Result<Schedule, schedules::Error> {
        let mut stores = self.inner.lock()?;
        let schedule = transition(
            &mut stores.schedules,
            schedule_id,
            Actor::Fulfiller(fulfiller_id),
            ScheduleStatus::CompletedByProvider,
        )?;

        Ok(schedule)
    }

    async fn confirm_pickup(
        &self,
        schedule_id: Uuid,
        requester_id: Uuid,
        reward_points: u32,
    ) -> Result<(Schedule, LedgerEntry), schedules::Error> {
        let mut stores = self.inner.lock()?;
        let stores = &mut *stores;

        // Second line of defense behind the status check: the credit key must
        // be free before we touch the schedule.
        if stores
            .entry_keys
            .contains(&(EntryReason::PickupConfirmed, schedule_id))
        {
            return Err(schedules::Error::DuplicateCredit(schedule_id));
        }
        let schedule = transition(
            &mut stores.schedules,
            schedule_id,
            Actor::Requester(requester_id),
            ScheduleStatus::ConfirmedByRequester,
        )?;
        let entry = stores
            .append(NewEntry {
                account_id: requester_id,
                delta: reward_points as i32,
                reason: EntryReason::PickupConfirmed,
                ref_id: schedule_id,
            })
            .map_err(|err| schedules::Error::Adapter(Box::new(err)))?;
        if let Some(request) = stores.requests.get_mut(&schedule.request_id) {
            request.status = RequestStatus::Fulfilled;
        }

        Ok((schedule, entry))
    }

    async fn insert_missed_report(
        &self,
        schedule_id: Uuid,
        requester_id: Uuid,
        reason: String,
    ) -> Result<MissedPickupReport, schedules::Error> {
        let mut stores = self.inner.lock()?;
        let stores = &mut *stores;

        if stores.reports.contains_key(&schedule_id) {
            return Err(schedules::Error::DuplicateReport(schedule_id));
        }
        transition(
            &mut stores.schedules,
            schedule_id,
            Actor::Requester(requester_id),
            ScheduleStatus::MissedReported,
        )?;

        let report = MissedPickupReport {
            report_id: Uuid::new_v4(),
            schedule_id,
            requester_id,
            reason,
            created_at: Utc::now(),
        };
        stores.reports.insert(schedule_id, report.clone());

        Ok(report)
    }
}

/// Which side of the schedule must be acting for a transition to apply.
enum Actor {
    Requester(Uuid),
    Fulfiller(Uuid),
}

/// Shared guard-and-write for schedule transitions; callers hold the lock.
fn transition(
    schedules: &mut HashMap<Uuid, Schedule>,
    schedule_id: Uuid,
    actor: Actor,
    to: ScheduleStatus,
) -> Result<Schedule, schedules::Error> {
    let schedule = schedules
        .get_mut(&schedule_id)
        .ok_or(schedules::Error::ScheduleNotFound(schedule_id))?;

    let (expected, actor_id) = match actor {
        Actor::Requester(id) => (schedule.requester_id, id),
        Actor::Fulfiller(id) => (schedule.fulfiller_id, id),
    };
    if expected != actor_id {
        return Err(schedules::Error::NotScheduleActor {
            schedule_id,
            actor_id,
        });
    }
    if !schedule.status.can_advance_to(to) {
        return Err(schedules::Error::InvalidTransition {
            schedule_id,
            from: schedule.status,
            to,
        });
    }

    schedule.status = to;
    Ok(schedule.clone())
}

#[async_trait::async_trait]
impl LedgerStore for MemoryStore {
    async fn append_entry(&self, new: NewEntry) -> Result<LedgerEntry, ledger::Error> {
        self.inner.lock()?.append(new)
    }

    async fn balance(&self, account_id: Uuid) -> Result<i64, ledger::Error> {
        Ok(self.inner.lock()?.balance(account_id))
    }

    async fn entries(&self, account_id: Uuid) -> Result<Vec<LedgerEntry>, ledger::Error> {
        Ok(self
            .inner
            .lock()?
            .entries
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn open_conversion(
        &self,
        account_id: Uuid,
        points: u32,
        currency_amount: f64,
    ) -> Result<ConversionRequest, ledger::Error> {
        let mut stores = self.inner.lock()?;

        let balance = stores.balance(account_id);
        if points as i64 > balance {
            return Err(ledger::Error::InsufficientBalance {
                account_id,
                balance,
                points,
            });
        }

        // Optimistic hold: the debit lands together with the pending
        // conversion, referenced by the conversion id.
        let conversion_id = Uuid::new_v4();
        stores.append(NewEntry {
            account_id,
            delta: -(points as i32),
            reason: EntryReason::ConversionDebit,
            ref_id: conversion_id,
        })?;
        let conversion = ConversionRequest {
            conversion_id,
            account_id,
            points,
            currency_amount,
            status: ConversionStatus::Pending,
            created_at: Utc::now(),
        };
        stores.conversions.insert(conversion_id, conversion.clone());

        Ok(conversion)
    }

    async fn resolve_conversion(
        &self,
        conversion_id: Uuid,
        decision: ConversionDecision,
    ) -> Result<ConversionResolution, ledger::Error> {
        let mut stores = self.inner.lock()?;
        let stores = &mut *stores;

        let conversion = stores
            .conversions
            .get_mut(&conversion_id)
            .ok_or(ledger::Error::ConversionNotFound(conversion_id))?;
        if conversion.status != ConversionStatus::Pending {
            return Err(ledger::Error::ConversionResolved {
                conversion_id,
                status: conversion.status,
            });
        }

        match decision {
            ConversionDecision::Approve => {
                // The debit from `open_conversion` stands as-is.
                conversion.status = ConversionStatus::Approved;
                Ok(ConversionResolution {
                    conversion: conversion.clone(),
                    restored: None,
                })
            }
            ConversionDecision::Reject => {
                conversion.status = ConversionStatus::Rejected;
                let conversion = conversion.clone();
                // The restore shares the conversion id as its reference, so
                // the uniqueness index forbids restoring twice even if the
                // status guard were raced.
                let entry = stores.append(NewEntry {
                    account_id: conversion.account_id,
                    delta: conversion.points as i32,
                    reason: EntryReason::ConversionRestore,
                    ref_id: conversion_id,
                })?;
                Ok(ConversionResolution {
                    conversion,
                    restored: Some(entry),
                })
            }
        }
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for requests::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for offers::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for schedules::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}

impl<T> From<PoisonError<T>> for ledger::Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}
