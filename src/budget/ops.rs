//! Store-backed budget operations.

use time::Date;

use crate::{
    AccountId, Amount, Error,
    budget::Budget,
    stores::{BudgetStore, NewBudget, TransactionQuery, TransactionStore},
    summary::category_spending,
};

/// Create a budget, seeding its `spent` total from the ledger.
///
/// The seed is the current-month expense total for the budget's category at
/// creation time, so a budget added mid-month immediately reflects the
/// spending that already happened.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyCategoryName] if the category is empty or whitespace,
/// - or any store error from reading the ledger or writing the budget.
pub fn create_budget<T, B>(
    transaction_store: &T,
    budget_store: &mut B,
    account: AccountId,
    new_budget: NewBudget,
    today: Date,
) -> Result<Budget, Error>
where
    T: TransactionStore,
    B: BudgetStore,
{
    if new_budget.category.trim().is_empty() {
        return Err(Error::EmptyCategoryName);
    }

    let ledger = transaction_store.get_query(account, TransactionQuery::default())?;
    let spent = category_spending(&ledger, today)
        .get(&new_budget.category)
        .copied()
        .unwrap_or(Amount::ZERO);

    budget_store.create(account, new_budget, spent)
}
