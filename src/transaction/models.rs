//! Core types for the transaction ledger.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AccountId, Amount, TransactionId};

/// Whether a transaction spent money or earned it.
///
/// The kind is the single authoritative discriminant: transaction amounts
/// are stored as unsigned magnitudes, so a record can never carry an income
/// kind with a negative amount or vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money spent. Expenses drive budget spending totals.
    Expense,
    /// Money earned. Income never affects budgets.
    Income,
}

impl TransactionKind {
    /// The kind as its lowercase database/display representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(FromSqlError::Other(
                format!("unknown transaction kind \"{other}\"").into(),
            )),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or
/// earned.
///
/// To create a new `Transaction`, use [Transaction::build] and pass the
/// builder to [add_transaction](crate::transaction::add_transaction) or a
/// [TransactionStore](crate::stores::TransactionStore) directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the transaction is an expense or income.
    pub kind: TransactionKind,
    /// The magnitude of money moved, always non-negative.
    pub amount: Amount,
    /// The name of the category the transaction belongs to.
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// How the transaction was paid, e.g. "card" or "cash".
    pub payment_method: String,
    /// Free-form labels attached to the transaction.
    pub tags: Vec<String>,
    /// Whether the transaction repeats on a schedule.
    pub recurring: bool,
    /// The account that owns the transaction.
    pub account_id: AccountId,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder::new] for discoverability.
    pub fn build(kind: TransactionKind, amount: Amount, date: Date) -> TransactionBuilder {
        TransactionBuilder::new(kind, amount, date)
    }

    /// The amount signed by kind: negative for expenses, positive for
    /// income. Useful for display and net totals.
    pub fn signed_amount(&self) -> Amount {
        match self.kind {
            TransactionKind::Expense => -self.amount,
            TransactionKind::Income => self.amount,
        }
    }
}

/// Builder for creating a new [Transaction].
///
/// Finalize the builder by passing it to
/// [add_transaction](crate::transaction::add_transaction) or
/// [TransactionStore::create](crate::stores::TransactionStore::create).
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// Whether the transaction is an expense or income.
    pub kind: TransactionKind,
    /// The magnitude of money moved. Normalized to its absolute value.
    pub amount: Amount,
    /// The name of the category the transaction belongs to.
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// How the transaction was paid.
    pub payment_method: String,
    /// Free-form labels attached to the transaction.
    pub tags: Vec<String>,
    /// Whether the transaction repeats on a schedule.
    pub recurring: bool,
}

impl TransactionBuilder {
    /// Create a builder for a transaction of `kind` moving `amount`, dated
    /// `date`. A negative `amount` is normalized to its magnitude; the sign
    /// of the stored value comes from `kind` alone.
    pub fn new(kind: TransactionKind, amount: Amount, date: Date) -> Self {
        Self {
            kind,
            amount: amount.abs(),
            category: String::new(),
            description: String::new(),
            date,
            payment_method: String::new(),
            tags: Vec::new(),
            recurring: false,
        }
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the payment method for the transaction.
    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = payment_method.into();
        self
    }

    /// Set the tags attached to the transaction.
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Mark the transaction as recurring.
    pub fn recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }
}

/// The fields of a transaction an update may change. `None` fields are left
/// as they are.
///
/// The kind and amount travel as a pair so an update can never flip a
/// transaction between expense and income without also stating the new
/// magnitude.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionChanges {
    /// Replace the kind and magnitude together.
    pub kind_and_amount: Option<(TransactionKind, Amount)>,
    /// Replace the category name.
    pub category: Option<String>,
    /// Replace the description.
    pub description: Option<String>,
    /// Replace the transaction date.
    pub date: Option<Date>,
    /// Replace the payment method.
    pub payment_method: Option<String>,
    /// Replace the tag list.
    pub tags: Option<Vec<String>>,
    /// Replace the recurring flag.
    pub recurring: Option<bool>,
}

impl TransactionChanges {
    /// Whether the change set leaves every field untouched.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
