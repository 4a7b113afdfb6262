use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::ports::{
    notifier::{Notification, NotifierPort},
    schedules::ScheduleStore,
};
use tower::Service;
use uuid::Uuid;

use super::{notify_best_effort, DomainLogic, Error};

pub struct ConfirmPickupRequest {
    pub schedule_id: Uuid,
    pub requester_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmPickupResponse {
    /// Points credited to the requester for this confirmation.
    pub rewards_earned: u32,
}

impl<D, I, G, N> Service<ConfirmPickupRequest> for DomainLogic<D, I, G, N>
where
    D: ScheduleStore + 'static,
    N: NotifierPort + 'static,
{
    type Response = ConfirmPickupResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ConfirmPickupRequest) -> Self::Future {
        let database = self.database.clone();
        let notifier = self.notifier.clone();
        let reward_points = self.rewards.pickup_reward_points;
        Box::pin(async move {
            // The status transition and the ledger credit land in one storage
            // transaction; a retried confirmation fails the status guard and
            // the `(PickupConfirmed, schedule_id)` key blocks any stray
            // second credit.
            let (schedule, entry) = database
                .confirm_pickup(req.schedule_id, req.requester_id, reward_points)
                .await?;
            tracing::info!(
                schedule_id = %schedule.schedule_id,
                entry_id = %entry.entry_id,
                rewards = entry.delta,
                "pickup confirmed by requester"
            );

            notify_best_effort(
                notifier.as_ref(),
                Notification {
                    account_id: schedule.fulfiller_id,
                    message: "The requester confirmed the pickup".to_string(),
                },
            )
            .await;

            Ok(ConfirmPickupResponse {
                rewards_earned: reward_points,
            })
        })
    }
}
