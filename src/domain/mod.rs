use chrono::{DateTime, Utc};
use std::str::FromStr;
use uuid::Uuid;

/// Recyclable material categories accepted by the marketplace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialType {
    Plastic,
    Paper,
    Metal,
    Glass,
    Electronics,
    Mixed,
}

impl FromStr for MaterialType {
    type Err = UnknownMaterial;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plastic" => Ok(Self::Plastic),
            "paper" => Ok(Self::Paper),
            "metal" => Ok(Self::Metal),
            "glass" => Ok(Self::Glass),
            "electronics" => Ok(Self::Electronics),
            "mixed" => Ok(Self::Mixed),
            _ => Err(UnknownMaterial(value.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown material type: {0}")]
pub struct UnknownMaterial(String);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    Open,
    OfferAccepted,
    Fulfilled,
    Deleted,
}

/// A posted ask for a recyclable-material pickup awaiting competitive offers.
#[derive(Clone, Debug)]
pub struct WasteRequest {
    pub request_id: Uuid,
    pub requester_id: Uuid,
    /// Immutable after creation.
    pub material: MaterialType,
    /// Immutable after creation. Always > 0.
    pub quantity: f64,
    pub unit: String,
    /// Pre-uploaded image reference; blob storage is the caller's concern.
    pub image_url: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfferStatus {
    Pending,
    /// Exactly one offer per request ever reaches this status.
    Accepted,
}

/// A priced bid from a fulfiller against an open request.
///
/// Offers that were pending when a sibling was accepted keep their `Pending`
/// status but become inert: the parent request no longer admits acceptance.
#[derive(Clone, Debug)]
pub struct Offer {
    pub offer_id: Uuid,
    pub request_id: Uuid,
    pub fulfiller_id: Uuid,
    /// Always > 0.
    pub price: f64,
    pub pickup_date: Option<DateTime<Utc>>,
    pub status: OfferStatus,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleStatus {
    Scheduled,
    TruckAssigned,
    CompletedByProvider,
    ConfirmedByRequester,
    MissedReported,
}

impl ScheduleStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ConfirmedByRequester | Self::MissedReported)
    }

    /// Forward-only transition predicate.
    ///
    /// `MissedReported` is a terminal branch reachable from any state that is
    /// not already terminal; no status ever regresses.
    pub fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Scheduled, Self::TruckAssigned) => true,
            (Self::Scheduled | Self::TruckAssigned, Self::CompletedByProvider) => true,
            (Self::CompletedByProvider, Self::ConfirmedByRequester) => true,
            (from, Self::MissedReported) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// The committed execution record created when an offer is accepted.
///
/// A schedule exists iff its originating offer was accepted. Price and pickup
/// date are copied from the winning offer at acceptance time.
#[derive(Clone, Debug)]
pub struct Schedule {
    pub schedule_id: Uuid,
    pub offer_id: Uuid,
    pub request_id: Uuid,
    pub requester_id: Uuid,
    pub fulfiller_id: Uuid,
    pub price: f64,
    pub pickup_date: Option<DateTime<Utc>>,
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
}

/// Requester-filed report that a scheduled pickup never happened.
///
/// At most one exists per schedule.
#[derive(Clone, Debug)]
pub struct MissedPickupReport {
    pub report_id: Uuid,
    pub schedule_id: Uuid,
    pub requester_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Why a ledger entry was appended.
///
/// Together with the reference id this forms the idempotence key: the store
/// rejects a second entry with the same `(reason, ref_id)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryReason {
    PickupConfirmed,
    ManholeResolutionConfirmed,
    ConversionDebit,
    ConversionRestore,
}

/// Immutable, append-only record of a point credit or debit.
#[derive(Clone, Debug)]
pub struct LedgerEntry {
    pub entry_id: Uuid,
    pub account_id: Uuid,
    /// Difference in points
    ///
    /// A positive number adds points to the current total. A negative number
    /// removes from it. The per-account sum never goes below zero.
    pub delta: i32,
    pub reason: EntryReason,
    /// Schedule or conversion the entry settles.
    pub ref_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Sum of deltas for one account's entries.
///
/// Balances are always derived from the entry log, never stored, so there is
/// no cached value to drift.
pub fn balance_of<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> i64 {
    entries.into_iter().map(|entry| entry.delta as i64).sum()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionStatus {
    Pending,
    Approved,
    Rejected,
}

/// A request to redeem ledger points for currency.
///
/// Points are debited when the conversion is opened (optimistic hold) and
/// restored exactly once iff the conversion is rejected.
#[derive(Clone, Debug)]
pub struct ConversionRequest {
    pub conversion_id: Uuid,
    pub account_id: Uuid,
    pub points: u32,
    pub currency_amount: f64,
    pub status: ConversionStatus,
    pub created_at: DateTime<Utc>,
}
