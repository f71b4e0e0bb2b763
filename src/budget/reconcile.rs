//! Keeps budget `spent` totals consistent with the transaction ledger.
//!
//! Two update modes exist. A signed delta handles the single create or
//! delete of an expense transaction: it costs one write per matching budget
//! and never scans the ledger. A full recompute handles transaction edits,
//! where the previous category, amount, and date are not known to the
//! caller and a delta cannot be derived; it re-aggregates the whole ledger
//! and rewrites every budget. Recompute is idempotent, so it doubles as the
//! on-demand repair operation after a partial failure.

use time::Date;

use crate::{
    AccountId, Amount, BudgetId, Error,
    stores::{BudgetStore, TransactionQuery, TransactionStore},
    summary::category_spending,
};

/// A budget whose recomputed `spent` value could not be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationFailure {
    /// The budget whose write failed.
    pub budget_id: BudgetId,
    /// The store error, rendered as text.
    pub message: String,
}

/// Apply a signed spending delta to every budget matching `category`.
///
/// `delta` is positive when an expense was created and negative when one
/// was deleted. Each matching budget's `spent` is clamped at zero, so
/// deleting more expense value than a category has recorded cannot drive
/// the total negative. No matching budget is a no-op, not an error.
///
/// Callers are responsible for only routing current-month expense
/// transactions here; anything else must not move `spent`.
///
/// # Errors
/// Returns [Error::PartialReconciliation] if one or more budget writes
/// failed. The remaining matching budgets are still written.
pub(crate) fn apply_spending_delta<B>(
    budget_store: &mut B,
    account: AccountId,
    category: &str,
    delta: Amount,
) -> Result<(), Error>
where
    B: BudgetStore,
{
    let mut failures = Vec::new();

    for budget in budget_store.get_all(account)? {
        if budget.category != category {
            continue;
        }

        let spent = (budget.spent + delta).max(Amount::ZERO);

        if let Err(error) = budget_store.update_spent(account, budget.id, spent) {
            tracing::error!(
                "failed to persist spending for budget {}: {}",
                budget.id,
                error
            );
            failures.push(ReconciliationFailure {
                budget_id: budget.id,
                message: error.to_string(),
            });
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::PartialReconciliation(failures))
    }
}

/// Recompute every budget's `spent` total from the ledger.
///
/// The ledger is aggregated once; each budget is then set to its category's
/// current-month total, or zero when the category has no expenses this
/// month. Budgets are written independently: a failed write is recorded and
/// the loop continues, so one broken row cannot leave the rest stale.
///
/// # Errors
/// Returns [Error::PartialReconciliation] if one or more budget writes
/// failed. Running the recompute again retries every budget.
pub fn recompute_spending<T, B>(
    transaction_store: &T,
    budget_store: &mut B,
    account: AccountId,
    today: Date,
) -> Result<(), Error>
where
    T: TransactionStore,
    B: BudgetStore,
{
    let budgets = budget_store.get_all(account)?;

    if budgets.is_empty() {
        return Ok(());
    }

    let ledger = transaction_store.get_query(account, TransactionQuery::default())?;
    let spending = category_spending(&ledger, today);

    let mut failures = Vec::new();

    for budget in budgets {
        let spent = spending
            .get(&budget.category)
            .copied()
            .unwrap_or(Amount::ZERO);

        if let Err(error) = budget_store.update_spent(account, budget.id, spent) {
            tracing::error!(
                "failed to persist spending for budget {}: {}",
                budget.id,
                error
            );
            failures.push(ReconciliationFailure {
                budget_id: budget.id,
                message: error.to_string(),
            });
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::PartialReconciliation(failures))
    }
}
