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

pub struct MarkCompletedRequest {
    pub schedule_id: Uuid,
    pub fulfiller_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct MarkCompletedResponse;

impl<D, I, G, N> Service<MarkCompletedRequest> for DomainLogic<D, I, G, N>
where
    D: ScheduleStore + 'static,
    N: NotifierPort + 'static,
{
    type Response = MarkCompletedResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: MarkCompletedRequest) -> Self::Future {
        let database = self.database.clone();
        let notifier = self.notifier.clone();
        Box::pin(async move {
            let schedule = database
                .mark_completed(req.schedule_id, req.fulfiller_id)
                .await?;
            tracing::info!(schedule_id = %schedule.schedule_id, "pickup completed by provider");

            // Nudge the requester to confirm; delivery is best-effort.
            notify_best_effort(
                notifier.as_ref(),
                Notification {
                    account_id: schedule.requester_id,
                    message: "Your pickup was completed; please confirm".to_string(),
                },
            )
            .await;

            Ok(MarkCompletedResponse)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::database::memory::MemoryStore, commands::testing, domain::ScheduleStatus,
    };
    use speculoos::prelude::*;
    use tower::{BoxError, ServiceExt};

    #[tokio::test]
    async fn test_provider_completes_scheduled_pickup() -> Result<(), BoxError> {
        let store = MemoryStore::default();
        let fulfiller_id = Uuid::new_v4();
        let schedule = testing::seed_schedule(&store, Uuid::new_v4(), fulfiller_id).await;
        let mut domain = testing::logic(&store);

        let res = ServiceExt::<MarkCompletedRequest>::ready(&mut domain)
            .await?
            .call(MarkCompletedRequest {
                schedule_id: schedule.schedule_id,
                fulfiller_id,
            })
            .await;

        assert_that!(res).is_ok();
        let schedule = store.get_schedule(schedule.schedule_id).await?;
        assert_that!(schedule.status).is_equal_to(ScheduleStatus::CompletedByProvider);

        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_fulfiller_forbidden() -> Result<(), BoxError> {
        let store = MemoryStore::default();
        let schedule = testing::seed_schedule(&store, Uuid::new_v4(), Uuid::new_v4()).await;
        let mut domain = testing::logic(&store);

        let res = ServiceExt::<MarkCompletedRequest>::ready(&mut domain)
            .await?
            .call(MarkCompletedRequest {
                schedule_id: schedule.schedule_id,
                fulfiller_id: Uuid::new_v4(),
            })
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Forbidden(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_double_completion_conflicts() -> Result<(), BoxError> {
        let store = MemoryStore::default();
        let fulfiller_id = Uuid::new_v4();
        let schedule =
            testing::seed_completed_schedule(&store, Uuid::new_v4(), fulfiller_id).await;
        let mut domain = testing::logic(&store);

        let res = ServiceExt::<MarkCompletedRequest>::ready(&mut domain)
            .await?
            .call(MarkCompletedRequest {
                schedule_id: schedule.schedule_id,
                fulfiller_id,
            })
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Conflict(_)));

        Ok(())
    }
}
