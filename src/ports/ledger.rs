use uuid::Uuid;

use crate::domain::{ConversionRequest, ConversionStatus, EntryReason, LedgerEntry};

#[derive(Clone, Debug)]
pub struct NewEntry {
    pub account_id: Uuid,
    pub delta: i32,
    pub reason: EntryReason,
    pub ref_id: Uuid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionDecision {
    Approve,
    Reject,
}

/// Outcome of resolving a conversion. `restored` is set iff the decision was
/// a rejection and carries the restore entry.
#[derive(Clone, Debug)]
pub struct ConversionResolution {
    pub conversion: ConversionRequest,
    pub restored: Option<LedgerEntry>,
}

#[mockall::automock]
#[async_trait::async_trait]
pub trait LedgerStore {
    /// Appends an immutable entry. The `(reason, ref_id)` pair is a
    /// uniqueness key enforced at insert time, closing the race between
    /// "check no entry exists" and "insert" under concurrent retries.
    async fn append_entry(&self, new: NewEntry) -> Result<LedgerEntry, Error>;
    /// Derived balance: the sum of all entry deltas for the account. Never
    /// materialized as mutable state.
    async fn balance(&self, account_id: Uuid) -> Result<i64, Error>;
    async fn entries(&self, account_id: Uuid) -> Result<Vec<LedgerEntry>, Error>;
    /// Opens a conversion: checks the balance covers `points`, appends the
    /// `ConversionDebit` entry (reference = conversion id), and stores the
    /// pending conversion, all in one transaction (optimistic hold).
    async fn open_conversion(
        &self,
        account_id: Uuid,
        points: u32,
        currency_amount: f64,
    ) -> Result<ConversionRequest, Error>;
    /// Finalizes a pending conversion. Rejection appends the single
    /// `ConversionRestore` entry (reference = conversion id, so the
    /// uniqueness key forbids a second restore); approval leaves the debit
    /// standing.
    async fn resolve_conversion(
        &self,
        conversion_id: Uuid,
        decision: ConversionDecision,
    ) -> Result<ConversionResolution, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An entry with this idempotence key was already appended.
    #[error("ledger entry for ({reason:?}, {ref_id}) already exists")]
    DuplicateReference { reason: EntryReason, ref_id: Uuid },

    /// Trying to remove too many points
    ///
    /// This would result in a negative account balance, which is not supported.
    #[error("trying to subtract too many points: {delta} from {current}")]
    NegativeBalance {
        account_id: Uuid,
        current: i64,
        delta: i32,
    },

    #[error("account {account_id} holds {balance} points, {points} requested")]
    InsufficientBalance {
        account_id: Uuid,
        balance: i64,
        points: u32,
    },

    #[error("conversion {0} does not exist")]
    ConversionNotFound(Uuid),

    #[error("conversion {conversion_id} was already resolved ({status:?})")]
    ConversionResolved {
        conversion_id: Uuid,
        status: ConversionStatus,
    },

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
