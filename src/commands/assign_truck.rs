use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{domain::ScheduleStatus, ports::schedules::ScheduleStore};
use tower::Service;
use uuid::Uuid;

use super::{DomainLogic, Error};

/// Records that the fulfiller assigned a truck/resource to the pickup. The
/// assignment itself (fleet management) is an external concern; this is the
/// schedule-side state change only.
pub struct AssignTruckRequest {
    pub schedule_id: Uuid,
    pub fulfiller_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct AssignTruckResponse {
    pub status: ScheduleStatus,
}

impl<D, I, G, N> Service<AssignTruckRequest> for DomainLogic<D, I, G, N>
where
    D: ScheduleStore + 'static,
{
    type Response = AssignTruckResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: AssignTruckRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            let schedule = database
                .assign_truck(req.schedule_id, req.fulfiller_id)
                .await?;
            tracing::info!(schedule_id = %schedule.schedule_id, "truck assigned");

            Ok(AssignTruckResponse {
                status: schedule.status,
            })
        })
    }
}
