//! Transaction aggregation for the current calendar month.
//!
//! Provides the derived views over the ledger: per-category expense totals
//! and the monthly income/expense summary. Both are pure functions over
//! already-loaded transactions; they never fail and return empty results
//! for empty input.

use std::collections::HashMap;

use serde::Serialize;
use time::Date;

use crate::{
    Amount,
    period::is_in_month,
    transaction::{Transaction, TransactionKind},
};

/// Income, expense, and net totals for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyStats {
    /// The sum of income amounts for the month.
    pub total_income: Amount,
    /// The sum of expense magnitudes for the month, never negative.
    pub total_expenses: Amount,
    /// `total_income` minus `total_expenses`; negative when more was spent
    /// than earned.
    pub net_income: Amount,
    /// How many transactions the month has, income and expense alike.
    pub transaction_count: usize,
}

/// Sums expense magnitudes by category for the calendar month containing
/// `anchor`.
///
/// Income transactions and transactions outside the month are ignored.
/// Category names match exactly (case-sensitive). Categories with no
/// matching transactions are absent from the map rather than present with
/// a zero value.
pub fn category_spending(transactions: &[Transaction], anchor: Date) -> HashMap<String, Amount> {
    let mut spending = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense || !is_in_month(transaction.date, anchor) {
            continue;
        }

        *spending
            .entry(transaction.category.clone())
            .or_insert(Amount::ZERO) += transaction.amount;
    }

    spending
}

/// Derives the income/expense summary for the calendar month containing
/// `anchor`.
pub fn monthly_stats(transactions: &[Transaction], anchor: Date) -> MonthlyStats {
    let mut total_income = Amount::ZERO;
    let mut total_expenses = Amount::ZERO;
    let mut transaction_count = 0;

    for transaction in transactions {
        if !is_in_month(transaction.date, anchor) {
            continue;
        }

        transaction_count += 1;

        match transaction.kind {
            TransactionKind::Income => total_income += transaction.amount,
            TransactionKind::Expense => total_expenses += transaction.amount,
        }
    }

    MonthlyStats {
        total_income,
        total_expenses,
        net_income: total_income - total_expenses,
        transaction_count,
    }
}
