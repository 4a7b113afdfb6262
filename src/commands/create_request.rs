use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::MaterialType,
    ports::{
        identity::IdentityPort,
        requests::{NewRequest, RequestStore},
    },
};
use tower::Service;
use uuid::Uuid;

use super::{DomainLogic, Error};

pub struct CreateRequestRequest {
    pub requester_id: Uuid,
    pub material: MaterialType,
    pub quantity: f64,
    pub unit: String,
    /// Reference to an already-uploaded image; blob storage happens before
    /// this call, never inside it.
    pub image_url: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CreateRequestResponse {
    pub request_id: Uuid,
}

impl<D, I, G, N> Service<CreateRequestRequest> for DomainLogic<D, I, G, N>
where
    D: RequestStore + 'static,
    I: IdentityPort + 'static,
{
    type Response = CreateRequestResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CreateRequestRequest) -> Self::Future {
        let database = self.database.clone();
        let identity = self.identity.clone();
        Box::pin(async move {
            // Validate before any state mutation
            if !req.quantity.is_finite() || req.quantity <= 0.0 {
                return Err(Error::InvalidArgument(
                    format!("quantity must be positive, got {}", req.quantity).into(),
                ));
            }
            if req.unit.trim().is_empty() {
                return Err(Error::InvalidArgument("unit must not be empty".into()));
            }
            identity.get_account(req.requester_id).await?;

            let request = database
                .insert_request(NewRequest {
                    requester_id: req.requester_id,
                    material: req.material,
                    quantity: req.quantity,
                    unit: req.unit,
                    image_url: req.image_url,
                })
                .await?;
            tracing::info!(
                request_id = %request.request_id,
                requester_id = %request.requester_id,
                material = ?request.material,
                "request created"
            );

            Ok(CreateRequestResponse {
                request_id: request.request_id,
            })
        })
    }
}
