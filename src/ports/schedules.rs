use uuid::Uuid;

use crate::domain::{LedgerEntry, MissedPickupReport, Schedule, ScheduleStatus};

/// Storage for schedules and their missed-pickup reports.
///
/// Each transition is a single method so the adapter can check the actor and
/// the current status and apply the write as one atomic unit.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ScheduleStore {
    async fn get_schedule(&self, schedule_id: Uuid) -> Result<Schedule, Error>;
    /// `Scheduled` → `TruckAssigned`, by the owning fulfiller.
    async fn assign_truck(&self, schedule_id: Uuid, fulfiller_id: Uuid) -> Result<Schedule, Error>;
    /// `Scheduled`/`TruckAssigned` → `CompletedByProvider`, by the owning
    /// fulfiller.
    async fn mark_completed(
        &self,
        schedule_id: Uuid,
        fulfiller_id: Uuid,
    ) -> Result<Schedule, Error>;
    /// `CompletedByProvider` → `ConfirmedByRequester`, by the owning
    /// requester. Appends the `PickupConfirmed` ledger credit (reference =
    /// schedule id) and marks the parent request fulfilled in the same
    /// transaction, so a storage failure can never confirm without crediting.
    async fn confirm_pickup(
        &self,
        schedule_id: Uuid,
        requester_id: Uuid,
        reward_points: u32,
    ) -> Result<(Schedule, LedgerEntry), Error>;
    /// Files the one-per-schedule missed report and moves the schedule to
    /// `MissedReported`.
    async fn insert_missed_report(
        &self,
        schedule_id: Uuid,
        requester_id: Uuid,
        reason: String,
    ) -> Result<MissedPickupReport, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("schedule {0} does not exist")]
    ScheduleNotFound(Uuid),

    #[error("account {actor_id} is not the acting party for schedule {schedule_id}")]
    NotScheduleActor { schedule_id: Uuid, actor_id: Uuid },

    /// The schedule is not in a state that admits the requested transition.
    #[error("schedule {schedule_id} cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        schedule_id: Uuid,
        from: ScheduleStatus,
        to: ScheduleStatus,
    },

    /// A missed-pickup report already exists for this schedule.
    #[error("schedule {0} already has a missed-pickup report")]
    DuplicateReport(Uuid),

    /// The `(PickupConfirmed, schedule_id)` ledger key already exists.
    #[error("schedule {0} was already credited")]
    DuplicateCredit(Uuid),

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
