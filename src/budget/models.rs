//! Core types for category budgets.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, BudgetId};

/// The nominal cadence a budget limit applies to.
///
/// The period is carried for display; spending totals are always computed
/// over the current calendar month regardless of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// The limit applies per calendar month.
    Monthly,
    /// The limit applies per week.
    Weekly,
}

impl BudgetPeriod {
    /// The period as its lowercase database/display representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }
}

impl ToSql for BudgetPeriod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BudgetPeriod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "monthly" => Ok(Self::Monthly),
            "weekly" => Ok(Self::Weekly),
            other => Err(FromSqlError::Other(
                format!("unknown budget period \"{other}\"").into(),
            )),
        }
    }
}

/// A spending limit for one category.
///
/// `spent` is derived from the transaction ledger, not independently
/// authoritative: it equals the sum of current-month expense magnitudes in
/// `category` once reconciliation has run, and it is only ever written by
/// the reconciliation code in [crate::budget].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The name of the category the budget limits. Several budgets may
    /// share a category; reconciliation updates every match.
    pub category: String,
    /// The spending limit for the period.
    pub amount: Amount,
    /// The derived current-month spending total, never negative.
    pub spent: Amount,
    /// The nominal cadence of the limit.
    pub period: BudgetPeriod,
    /// The display color for the budget, e.g. "#22c55e".
    pub color: String,
    /// The account that owns the budget.
    pub account_id: AccountId,
}

impl Budget {
    /// How much of the limit is left, negative once overspent.
    pub fn remaining(&self) -> Amount {
        self.amount - self.spent
    }
}
