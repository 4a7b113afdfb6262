use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::WasteRequest,
    ports::{geo::GeoPort, requests::RequestStore},
};
use tower::Service;
use uuid::Uuid;

use super::{DomainLogic, Error};

pub struct ListOpenRequestsRequest {
    pub fulfiller_id: Uuid,
}

#[derive(Debug)]
pub struct ListOpenRequestsResponse {
    /// Open requests near the fulfiller, oldest first, never their own.
    pub requests: Vec<WasteRequest>,
}

impl<D, I, G, N> Service<ListOpenRequestsRequest> for DomainLogic<D, I, G, N>
where
    D: RequestStore + 'static,
    G: GeoPort + 'static,
{
    type Response = ListOpenRequestsResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ListOpenRequestsRequest) -> Self::Future {
        let database = self.database.clone();
        let geo = self.geo.clone();
        Box::pin(async move {
            let candidates = database.list_open_requests(req.fulfiller_id).await?;
            // Proximity is the geo collaborator's call, made outside any
            // storage transaction.
            let requests = geo.filter_near(req.fulfiller_id, candidates).await?;

            Ok(ListOpenRequestsResponse { requests })
        })
    }
}
