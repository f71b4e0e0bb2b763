//! Category budgets and the ledger reconciliation that maintains them.

mod models;
mod ops;
mod reconcile;

pub use models::{Budget, BudgetPeriod};
pub use ops::create_budget;
pub(crate) use reconcile::apply_spending_delta;
pub use reconcile::{ReconciliationFailure, recompute_spending};
