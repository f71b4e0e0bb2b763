//! Defines the transaction store trait.

use std::ops::RangeInclusive;

use time::Date;

use crate::{
    AccountId, Error, TransactionId,
    transaction::{Transaction, TransactionBuilder, TransactionChanges},
};

/// Handles the creation and retrieval of transactions.
///
/// The store is the source of truth for aggregation: budget reconciliation
/// and the monthly summaries read the ledger through this trait.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    fn create(
        &mut self,
        account: AccountId,
        builder: TransactionBuilder,
    ) -> Result<Transaction, Error>;

    /// Retrieve a transaction from the store.
    fn get(&self, account: AccountId, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve transactions from the store in the way defined by `query`.
    fn get_query(
        &self,
        account: AccountId,
        query: TransactionQuery,
    ) -> Result<Vec<Transaction>, Error>;

    /// Apply `changes` to an existing transaction.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingTransaction] if `id` does not refer to a
    /// transaction owned by `account`.
    fn update(
        &mut self,
        account: AccountId,
        id: TransactionId,
        changes: TransactionChanges,
    ) -> Result<(), Error>;

    /// Delete a transaction from the store.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingTransaction] if `id` does not refer to a
    /// transaction owned by `account`.
    fn delete(&mut self, account: AccountId, id: TransactionId) -> Result<(), Error>;
}

/// Defines how transactions should be fetched from
/// [TransactionStore::get_query].
#[derive(Debug, Default)]
pub struct TransactionQuery {
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u64>,
    /// Orders transactions by date in the order `sort_date`. None returns
    /// transactions in the order they are stored.
    pub sort_date: Option<SortOrder>,
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}
