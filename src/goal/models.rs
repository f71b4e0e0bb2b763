//! Core types for savings goals.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{AccountId, Amount, GoalId};

/// A savings goal with a target amount and a running balance.
///
/// Goals are not coupled to the transaction ledger; money is added through
/// [add_money_to_goal](crate::goal::add_money_to_goal), which clamps the
/// balance so `0 <= current_amount <= target_amount` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// What the user is saving for.
    pub title: String,
    /// The amount to save in total.
    pub target_amount: Amount,
    /// The amount saved so far, between zero and the target.
    pub current_amount: Amount,
    /// When the user wants to reach the target.
    pub deadline: Date,
    /// The display color for the goal, e.g. "#3b82f6".
    pub color: String,
    /// The account that owns the goal.
    pub account_id: AccountId,
}

impl Goal {
    /// How much is still missing to reach the target.
    pub fn remaining(&self) -> Amount {
        self.target_amount - self.current_amount
    }

    /// Whether the goal has been fully funded.
    pub fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}
