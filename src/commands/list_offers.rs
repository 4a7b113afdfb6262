use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{domain::Offer, ports::offers::OfferStore};
use tower::Service;
use uuid::Uuid;

use super::{DomainLogic, Error};

pub struct ListOffersRequest {
    pub request_id: Uuid,
}

#[derive(Debug)]
pub struct ListOffersResponse {
    /// Ordered by submission time ascending. No ranking is implied; the
    /// selection is the requester's choice.
    pub offers: Vec<Offer>,
}

impl<D, I, G, N> Service<ListOffersRequest> for DomainLogic<D, I, G, N>
where
    D: OfferStore + 'static,
{
    type Response = ListOffersResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ListOffersRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            let offers = database.list_offers(req.request_id).await?;

            Ok(ListOffersResponse { offers })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::database::memory::MemoryStore, commands::testing};
    use speculoos::prelude::*;
    use tower::{BoxError, ServiceExt};

    #[tokio::test]
    async fn test_offers_ordered_by_submission() -> Result<(), BoxError> {
        // GIVEN two offers submitted in sequence
        let store = MemoryStore::default();
        let request = testing::seed_request(&store, Uuid::new_v4()).await;
        let first = testing::seed_offer(&store, request.request_id, Uuid::new_v4(), 50.0).await;
        let second = testing::seed_offer(&store, request.request_id, Uuid::new_v4(), 40.0).await;
        let mut domain = testing::logic(&store);

        // WHEN listing them
        let res = ServiceExt::<ListOffersRequest>::ready(&mut domain)
            .await?
            .call(ListOffersRequest {
                request_id: request.request_id,
            })
            .await;

        // THEN the earliest comes first
        assert_that!(res).is_ok().matches(|response| {
            response.offers.len() == 2
                && response.offers[0].offer_id == first.offer_id
                && response.offers[1].offer_id == second.offer_id
        });

        Ok(())
    }

    #[tokio::test]
    async fn test_absent_request_not_found() -> Result<(), BoxError> {
        let store = MemoryStore::default();
        let mut domain = testing::logic(&store);

        let res = ServiceExt::<ListOffersRequest>::ready(&mut domain)
            .await?
            .call(ListOffersRequest {
                request_id: Uuid::new_v4(),
            })
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::NotFound(_)));

        Ok(())
    }
}
