//! The transaction ledger: models and store-backed operations.

mod models;
mod ops;

pub use models::{Transaction, TransactionBuilder, TransactionChanges, TransactionKind};
pub use ops::{add_transaction, delete_transaction, update_transaction};
