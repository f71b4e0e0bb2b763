//! Dépensier is a personal finance tracker core: a transaction ledger with
//! per-category budgets and savings goals.
//!
//! The crate's central concern is keeping every budget's `spent` total
//! consistent with the transaction ledger as transactions are created,
//! edited, and removed. Single creates and deletes apply a signed spending
//! delta to the matching budgets; edits trigger a full recompute from the
//! ledger because the previous category, amount, and date are not known to
//! the caller. All money values are integer cents ([Amount]), so aggregates
//! never accumulate binary floating-point error.
//!
//! Persistence sits behind the store traits in [stores]; a SQLite
//! implementation is provided for the bundled binaries and tests.

#![warn(missing_docs)]

pub mod account;
pub mod app_state;
pub mod budget;
pub mod currency;
mod database_id;
pub mod db;
pub mod goal;
pub mod period;
pub mod stores;
pub mod summary;
pub mod timezone;
pub mod transaction;

pub use account::AccountId;
pub use app_state::AppState;
pub use currency::Amount;
pub use database_id::{BudgetId, DatabaseId, GoalId, TransactionId};
pub use db::initialize as initialize_db;

use crate::budget::ReconciliationFailure;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used as a transaction or budget category.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used as a goal title.
    #[error("goal title cannot be empty")]
    EmptyGoalTitle,

    /// An error occurred while getting the local timezone from a canonical
    /// timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// An error occurred while serializing or deserializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),

    /// Tried to update a transaction that does not exist.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a budget that does not exist.
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist.
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to update a goal that does not exist.
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to delete a goal that does not exist.
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// One or more budgets failed to persist a recomputed `spent` value.
    ///
    /// The remaining budgets were still written; the failures carry the ID
    /// and error message of every budget whose write failed. Re-running a
    /// full recompute retries every budget and self-heals the stale ones.
    #[error("failed to persist recomputed spending for {} budget(s)", .0.len())]
    PartialReconciliation(Vec<ReconciliationFailure>),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
