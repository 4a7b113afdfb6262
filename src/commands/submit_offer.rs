use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::ports::offers::{NewOffer, OfferStore};
use chrono::{DateTime, Utc};
use tower::Service;
use uuid::Uuid;

use super::{DomainLogic, Error};

pub struct SubmitOfferRequest {
    pub request_id: Uuid,
    pub fulfiller_id: Uuid,
    pub price: f64,
    pub pickup_date: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SubmitOfferResponse {
    pub offer_id: Uuid,
}

impl<D, I, G, N> Service<SubmitOfferRequest> for DomainLogic<D, I, G, N>
where
    D: OfferStore + 'static,
{
    type Response = SubmitOfferResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: SubmitOfferRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            if !req.price.is_finite() || req.price <= 0.0 {
                return Err(Error::InvalidArgument(
                    format!("price must be positive, got {}", req.price).into(),
                ));
            }

            // The open-request and duplicate-offer guards run inside the
            // store's transaction.
            let offer = database
                .insert_offer(NewOffer {
                    request_id: req.request_id,
                    fulfiller_id: req.fulfiller_id,
                    price: req.price,
                    pickup_date: req.pickup_date,
                })
                .await?;
            tracing::info!(
                offer_id = %offer.offer_id,
                request_id = %offer.request_id,
                fulfiller_id = %offer.fulfiller_id,
                "offer submitted"
            );

            Ok(SubmitOfferResponse {
                offer_id: offer.offer_id,
            })
        })
    }
}
