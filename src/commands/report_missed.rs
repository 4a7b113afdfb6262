use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::ports::schedules::ScheduleStore;
use tower::Service;
use uuid::Uuid;

use super::{DomainLogic, Error};

pub struct ReportMissedRequest {
    pub schedule_id: Uuid,
    pub requester_id: Uuid,
    pub reason: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ReportMissedResponse {
    pub report_id: Uuid,
}

impl<D, I, G, N> Service<ReportMissedRequest> for DomainLogic<D, I, G, N>
where
    D: ScheduleStore + 'static,
{
    type Response = ReportMissedResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ReportMissedRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            let report = database
                .insert_missed_report(req.schedule_id, req.requester_id, req.reason)
                .await?;
            tracing::info!(
                report_id = %report.report_id,
                schedule_id = %report.schedule_id,
                "missed pickup reported"
            );

            Ok(ReportMissedResponse {
                report_id: report.report_id,
            })
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

    fn report(schedule_id: Uuid, requester_id: Uuid) -> ReportMissedRequest {
        ReportMissedRequest {
            schedule_id,
            requester_id,
            reason: "truck never arrived".to_string(),
        }
    }

    #[tokio::test]
    async fn test_report_moves_schedule_to_missed() -> Result<(), BoxError> {
        let store = MemoryStore::default();
        let requester_id = Uuid::new_v4();
        let schedule = testing::seed_schedule(&store, requester_id, Uuid::new_v4()).await;
        let mut domain = testing::logic(&store);

        let res = ServiceExt::<ReportMissedRequest>::ready(&mut domain)
            .await?
            .call(report(schedule.schedule_id, requester_id))
            .await;

        assert_that!(res).is_ok();
        let schedule = store.get_schedule(schedule.schedule_id).await?;
        assert_that!(schedule.status).is_equal_to(ScheduleStatus::MissedReported);

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_report_conflicts() -> Result<(), BoxError> {
        let store = MemoryStore::default();
        let requester_id = Uuid::new_v4();
        let schedule = testing::seed_schedule(&store, requester_id, Uuid::new_v4()).await;
        let mut domain = testing::logic(&store);
        ServiceExt::<ReportMissedRequest>::ready(&mut domain)
            .await?
            .call(report(schedule.schedule_id, requester_id))
            .await?;

        let res = ServiceExt::<ReportMissedRequest>::ready(&mut domain)
            .await?
            .call(report(schedule.schedule_id, requester_id))
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Conflict(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_report_on_confirmed_schedule_conflicts() -> Result<(), BoxError> {
        // GIVEN a schedule that was already confirmed
        let store = MemoryStore::default();
        let requester_id = Uuid::new_v4();
        let schedule =
            testing::seed_completed_schedule(&store, requester_id, Uuid::new_v4()).await;
        store
            .confirm_pickup(schedule.schedule_id, requester_id, 50)
            .await?;
        let mut domain = testing::logic(&store);

        let res = ServiceExt::<ReportMissedRequest>::ready(&mut domain)
            .await?
            .call(report(schedule.schedule_id, requester_id))
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Conflict(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_report_on_absent_schedule_not_found() -> Result<(), BoxError> {
        let store = MemoryStore::default();
        let mut domain = testing::logic(&store);

        let res = ServiceExt::<ReportMissedRequest>::ready(&mut domain)
            .await?
            .call(report(Uuid::new_v4(), Uuid::new_v4()))
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::NotFound(_)));

        Ok(())
    }
}
