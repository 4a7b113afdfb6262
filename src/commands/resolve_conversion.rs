use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::ports::ledger::{ConversionDecision, LedgerStore};
use tower::Service;
use uuid::Uuid;

use super::{DomainLogic, Error};

pub struct ResolveConversionRequest {
    pub conversion_id: Uuid,
    pub decision: ConversionDecision,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ResolveConversionResponse {
    /// Points handed back to the account; set only on rejection.
    pub points_restored: Option<u32>,
}

impl<D, I, G, N> Service<ResolveConversionRequest> for DomainLogic<D, I, G, N>
where
    D: LedgerStore + 'static,
{
    type Response = ResolveConversionResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ResolveConversionRequest) -> Self::Future {
        let database = self.database.clone();
        Box::pin(async move {
            let resolution = database
                .resolve_conversion(req.conversion_id, req.decision)
                .await?;
            tracing::info!(
                conversion_id = %resolution.conversion.conversion_id,
                decision = ?req.decision,
                "conversion resolved"
            );

            let points = resolution.conversion.points;
            Ok(ResolveConversionResponse {
                points_restored: resolution.restored.map(|_| points),
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

    async fn pending_conversion(store: &MemoryStore, points: u32) -> (Uuid, Uuid) {
        let account_id = Uuid::new_v4();
        store
            .append_entry(NewEntry {
                account_id,
                delta: points as i32,
                reason: EntryReason::PickupConfirmed,
                ref_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
        let conversion = store
            .open_conversion(account_id, points, points as f64 / 10.0)
            .await
            .unwrap();
        (account_id, conversion.conversion_id)
    }

    #[tokio::test]
    async fn test_rejection_restores_points_once() -> Result<(), BoxError> {
        // GIVEN a pending 1000-point conversion
        let store = MemoryStore::default();
        let (account_id, conversion_id) = pending_conversion(&store, 1000).await;
        let mut domain = testing::logic(&store);

        // WHEN rejecting it
        let res = ServiceExt::<ResolveConversionRequest>::ready(&mut domain)
            .await?
            .call(ResolveConversionRequest {
                conversion_id,
                decision: ConversionDecision::Reject,
            })
            .await;

        // THEN exactly the debited points come back
        assert_that!(res)
            .is_ok()
            .is_equal_to(ResolveConversionResponse {
                points_restored: Some(1000),
            });
        assert_that!(store.balance(account_id).await?).is_equal_to(1000);

        // AND resolving again conflicts with no second restore
        let res = ServiceExt::<ResolveConversionRequest>::ready(&mut domain)
            .await?
            .call(ResolveConversionRequest {
                conversion_id,
                decision: ConversionDecision::Reject,
            })
            .await;
        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::Conflict(_)));
        assert_that!(store.balance(account_id).await?).is_equal_to(1000);

        Ok(())
    }

    #[tokio::test]
    async fn test_approval_keeps_the_debit() -> Result<(), BoxError> {
        let store = MemoryStore::default();
        let (account_id, conversion_id) = pending_conversion(&store, 300).await;
        let mut domain = testing::logic(&store);

        let res = ServiceExt::<ResolveConversionRequest>::ready(&mut domain)
            .await?
            .call(ResolveConversionRequest {
                conversion_id,
                decision: ConversionDecision::Approve,
            })
            .await;

        assert_that!(res)
            .is_ok()
            .is_equal_to(ResolveConversionResponse {
                points_restored: None,
            });
        assert_that!(store.balance(account_id).await?).is_equal_to(0);

        Ok(())
    }

    #[tokio::test]
    async fn test_absent_conversion_not_found() -> Result<(), BoxError> {
        let store = MemoryStore::default();
        let mut domain = testing::logic(&store);

        let res = ServiceExt::<ResolveConversionRequest>::ready(&mut domain)
            .await?
            .call(ResolveConversionRequest {
                conversion_id: Uuid::new_v4(),
                decision: ConversionDecision::Approve,
            })
            .await;

        assert_that!(res)
            .is_err()
            .matches(|err| matches!(err, Error::NotFound(_)));

        Ok(())
    }
}
