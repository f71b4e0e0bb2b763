//! Store-backed transaction operations and their reconciliation routing.
//!
//! Every ledger mutation goes through here so budget `spent` totals stay
//! consistent with the ledger. The ledger write always completes before
//! reconciliation reads it; if reconciliation then fails, the error is
//! surfaced but the ledger write is not rolled back, and a later
//! [recompute_spending](crate::budget::recompute_spending) repairs the
//! budgets.

use time::Date;

use crate::{
    AccountId, Error, TransactionId,
    budget::{apply_spending_delta, recompute_spending},
    period::is_in_month,
    stores::{BudgetStore, TransactionStore},
    transaction::{Transaction, TransactionBuilder, TransactionChanges, TransactionKind},
};

/// Create a transaction and update the matching budgets.
///
/// An expense dated in the current month adds its magnitude to every budget
/// of the same category. Income, and expenses dated outside the current
/// month, leave budgets untouched; the month filter excludes them from
/// spending totals, so a delta would desynchronize `spent` from the ledger.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if the builder's category is empty or
///   whitespace,
/// - [Error::PartialReconciliation] if the transaction was created but one
///   or more budget writes failed,
/// - or any store error from writing the transaction.
pub fn add_transaction<T, B>(
    transaction_store: &mut T,
    budget_store: &mut B,
    account: AccountId,
    builder: TransactionBuilder,
    today: Date,
) -> Result<Transaction, Error>
where
    T: TransactionStore,
    B: BudgetStore,
{
    if builder.category.trim().is_empty() {
        return Err(Error::EmptyCategoryName);
    }

    let transaction = transaction_store.create(account, builder)?;

    if transaction.kind == TransactionKind::Expense && is_in_month(transaction.date, today) {
        apply_spending_delta(budget_store, account, &transaction.category, transaction.amount)?;
    }

    Ok(transaction)
}

/// Apply `changes` to a transaction and recompute every budget.
///
/// An update may move the transaction between categories, months, or kinds,
/// any of which invalidates a delta-based adjustment, so the budgets are
/// conservatively recomputed from the full ledger instead.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if the change set contains an empty or
///   whitespace category,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a
///   transaction owned by `account`,
/// - [Error::PartialReconciliation] if the update was applied but one or
///   more budget writes failed,
/// - or any other store error.
pub fn update_transaction<T, B>(
    transaction_store: &mut T,
    budget_store: &mut B,
    account: AccountId,
    id: TransactionId,
    mut changes: TransactionChanges,
    today: Date,
) -> Result<Transaction, Error>
where
    T: TransactionStore,
    B: BudgetStore,
{
    if let Some(category) = &changes.category {
        if category.trim().is_empty() {
            return Err(Error::EmptyCategoryName);
        }
    }

    if let Some((kind, amount)) = changes.kind_and_amount {
        changes.kind_and_amount = Some((kind, amount.abs()));
    }

    transaction_store.update(account, id, changes)?;

    recompute_spending(transaction_store, budget_store, account, today)?;

    transaction_store.get(account, id)
}

/// Delete a transaction and update the matching budgets.
///
/// The transaction is read first so its category and magnitude are known;
/// a current-month expense then subtracts its magnitude from every budget
/// of the same category, clamped at zero.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a
///   transaction owned by `account`,
/// - [Error::PartialReconciliation] if the transaction was deleted but one
///   or more budget writes failed,
/// - or any other store error.
pub fn delete_transaction<T, B>(
    transaction_store: &mut T,
    budget_store: &mut B,
    account: AccountId,
    id: TransactionId,
    today: Date,
) -> Result<(), Error>
where
    T: TransactionStore,
    B: BudgetStore,
{
    let transaction = match transaction_store.get(account, id) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::DeleteMissingTransaction),
        Err(error) => return Err(error),
    };

    transaction_store.delete(account, id)?;

    if transaction.kind == TransactionKind::Expense && is_in_month(transaction.date, today) {
        apply_spending_delta(
            budget_store,
            account,
            &transaction.category,
            -transaction.amount,
        )?;
    }

    Ok(())
}
