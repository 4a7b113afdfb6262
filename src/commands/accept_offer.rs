use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::ports::{
    notifier::{Notification, NotifierPort},
    offers::OfferStore,
};
use tower::Service;
use uuid::Uuid;

use super::{notify_best_effort, DomainLogic, Error};

pub struct AcceptOfferRequest {
    pub offer_id: Uuid,
    pub requester_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct AcceptOfferResponse {
    pub schedule_id: Uuid,
}

impl<D, I, G, N> Service<AcceptOfferRequest> for DomainLogic<D, I, G, N>
where
    D: OfferStore + 'static,
    N: NotifierPort + 'static,
{
    type Response = AcceptOfferResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: AcceptOfferRequest) -> Self::Future {
        let database = self.database.clone();
        let notifier = self.notifier.clone();
        Box::pin(async move {
            // One atomic unit: ownership and open-status checks, the offer
            // acceptance, the request closure, and the schedule creation.
            // Concurrent accepts on the same request leave one winner.
            let schedule = database
                .accept_offer(req.offer_id, req.requester_id)
                .await?;
            tracing::info!(
                schedule_id = %schedule.schedule_id,
                offer_id = %req.offer_id,
                request_id = %schedule.request_id,
                fulfiller_id = %schedule.fulfiller_id,
                "offer accepted"
            );

            notify_best_effort(
                notifier.as_ref(),
                Notification {
                    account_id: schedule.fulfiller_id,
                    message: "Your offer was accepted; pickup scheduled".to_string(),
                },
            )
            .await;

            Ok(AcceptOfferResponse {
                schedule_id: schedule.schedule_id,
            })
        })
    }
}
