use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::ports::requests::RequestStore;
use tower::Service;
use uuid::Uuid;

use super::{DomainLogic, Error};

pub struct DeleteRequestRequest {
    pub request_id: Uuid,
    pub requester_id: Uuid,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeleteRequestResponse;

impl<D, I, G, N> Service<DeleteRequestRequest> for DomainLogic<D, I, G, N>
where
    D: RequestStore + 'static,
{
    type Response = DeleteRequestResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DeleteRequestRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            database
                .delete_request(req.request_id, req.requester_id)
                .await?;
            tracing::info!(request_id = %req.request_id, "request deleted");

            Ok(DeleteRequestResponse)
        })
    }
}
