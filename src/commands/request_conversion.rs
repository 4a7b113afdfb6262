use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::ports::ledger::LedgerStore;
use tower::Service;
use uuid::Uuid;

use super::{DomainLogic, Error};

pub struct RequestConversionRequest {
    pub account_id: Uuid,
    pub points: u32,
}

#[derive(Debug, PartialEq)]
pub struct RequestConversionResponse {
    pub conversion_id: Uuid,
    /// Currency value of the held points at the configured rate.
    pub currency_amount: f64,
}

impl<D, I, G, N> Service<RequestConversionRequest> for DomainLogic<D, I, G, N>
where
    D: LedgerStore + 'static,
{
    type Response = RequestConversionResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RequestConversionRequest) -> Self::Future {
        let database = self.database.clone();
        let rewards = self.rewards;
        Box::pin(async move {
            if req.points == 0 {
                return Err(Error::InvalidArgument(
                    "points must be greater than zero".into(),
                ));
            }

            // Balance check, debit, and pending conversion land atomically;
            // the points are held until the approval decision.
            let conversion = database
                .open_conversion(
                    req.account_id,
                    req.points,
                    rewards.currency_amount(req.points),
                )
                .await?;
            tracing::info!(
                conversion_id = %conversion.conversion_id,
                account_id = %conversion.account_id,
                points = conversion.points,
                "conversion requested"
            );

            Ok(RequestConversionResponse {
                conversion_id: conversion.conversion_id,
                currency_amount: conversion.currency_amount,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::database::memory::MemoryStore,
        commands::testing,
        domain::EntryReason,
        ports::ledger::NewEntry,
    };
    use speculoos::prelude::*;
    use tower::{BoxError, ServiceExt};

    async fn credit(store: &MemoryStore, account_id: Uuid, points: i32) {
        store
            .append_entry(NewEntry {
                account_id,
                delta: points,
                reason: EntryReason::PickupConfirmed,
                ref_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_conversion_holds_points() -> Result<(), BoxError> {
        // GIVEN an account with 1000 points
        let store = MemoryStore::default();
        let account_id = Uuid::new_v4();
        credit(&store, account_id, 1000).await;
        let mut domain = testing::logic(&store);

        // WHEN requesting a 1000-point conversion
        let res = ServiceExt::<RequestConversionRequest>::ready(&mut domain)
            .await?
            .call(RequestConversionRequest {
                account_id,
                points: 1000,
            })
            .await;

        // THEN the points are debited immediately at the configured rate
        assert_that!(res)
            .is_ok()
            .matches(|response| response.currency_amount == 100.0);
        assert_that!(store.balance(account_id).await?).is_equal_to(0);

        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_balance_conflicts_without_entry() -> Result<(), BoxError> {
        // GIVEN an account with only 500 points
        let store = MemoryStore::default();
        let account_id = Uuid::new_v4();
        credit(&store, account_id, 500).await;
        let mut domain = testing::logic(&store);

        // WHEN requesting 1000 points
        let res = ServiceExt::<RequestConversionRequest>::ready(&mut domain)
            .await?
            .call(RequestConversionRequest {
                account_id,
                points: 1000,
            })
            .await;

        // THEN the call conflicts and no ledger entry was created
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Conflict(_)));
        assert_that!(store.balance(account_id).await?).is_equal_to(500);
        assert_that!(store.entries(account_id).await?).has_length(1);

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_points_rejected() -> Result<(), BoxError> {
        let store = MemoryStore::default();
        let mut domain = testing::logic(&store);

        let res = ServiceExt::<RequestConversionRequest>::ready(&mut domain)
            .await?
            .call(RequestConversionRequest {
                account_id: Uuid::new_v4(),
                points: 0,
            })
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::InvalidArgument(_)));

        Ok(())
    }
}
