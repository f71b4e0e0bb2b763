//! Defines the budget store trait.

use crate::{AccountId, Amount, BudgetId, Error, budget::Budget};

/// The caller-supplied fields of a new [Budget].
///
/// The derived `spent` total is deliberately absent: it is supplied
/// separately by the reconciliation code, which seeds it from the current
/// ledger at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The name of the category the budget limits.
    pub category: String,
    /// The spending limit for the period.
    pub amount: Amount,
    /// The nominal cadence of the limit.
    pub period: crate::budget::BudgetPeriod,
    /// The display color for the budget.
    pub color: String,
}

/// Handles the creation and retrieval of budgets.
pub trait BudgetStore {
    /// Create a new budget in the store with the given initial `spent`
    /// total.
    fn create(
        &mut self,
        account: AccountId,
        new_budget: NewBudget,
        spent: Amount,
    ) -> Result<Budget, Error>;

    /// Retrieve a budget from the store.
    fn get(&self, account: AccountId, id: BudgetId) -> Result<Budget, Error>;

    /// Retrieve all budgets owned by `account`.
    fn get_all(&self, account: AccountId) -> Result<Vec<Budget>, Error>;

    /// Replace a budget's spending limit. Never touches `spent`.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingBudget] if `id` does not refer to a
    /// budget owned by `account`.
    fn update_amount(
        &mut self,
        account: AccountId,
        id: BudgetId,
        amount: Amount,
    ) -> Result<(), Error>;

    /// Replace a budget's derived `spent` total.
    ///
    /// Reserved for the reconciliation code in [crate::budget]; calling it
    /// elsewhere breaks the ledger consistency invariant until the next
    /// recompute repairs it.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingBudget] if `id` does not refer to a
    /// budget owned by `account`.
    fn update_spent(
        &mut self,
        account: AccountId,
        id: BudgetId,
        spent: Amount,
    ) -> Result<(), Error>;

    /// Delete a budget from the store.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingBudget] if `id` does not refer to a
    /// budget owned by `account`.
    fn delete(&mut self, account: AccountId, id: BudgetId) -> Result<(), Error>;
}
