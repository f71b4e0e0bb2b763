//! Defines the goal store trait.

use time::Date;

use crate::{AccountId, Amount, Error, GoalId, goal::Goal};

/// The caller-supplied fields of a new [Goal].
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    /// What the user is saving for.
    pub title: String,
    /// The amount to save in total.
    pub target_amount: Amount,
    /// The starting balance, usually zero.
    pub current_amount: Amount,
    /// When the user wants to reach the target.
    pub deadline: Date,
    /// The display color for the goal.
    pub color: String,
}

/// The fields of a goal an update may change. `None` fields are left as
/// they are. The running balance is changed only through
/// [GoalStore::update_current_amount].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalChanges {
    /// Replace the title.
    pub title: Option<String>,
    /// Replace the target amount.
    pub target_amount: Option<Amount>,
    /// Replace the deadline.
    pub deadline: Option<Date>,
    /// Replace the display color.
    pub color: Option<String>,
}

/// Handles the creation and retrieval of savings goals.
pub trait GoalStore {
    /// Create a new goal in the store.
    fn create(&mut self, account: AccountId, new_goal: NewGoal) -> Result<Goal, Error>;

    /// Retrieve a goal from the store.
    fn get(&self, account: AccountId, id: GoalId) -> Result<Goal, Error>;

    /// Retrieve all goals owned by `account`.
    fn get_all(&self, account: AccountId) -> Result<Vec<Goal>, Error>;

    /// Apply `changes` to an existing goal.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingGoal] if `id` does not refer to a goal
    /// owned by `account`.
    fn update(
        &mut self,
        account: AccountId,
        id: GoalId,
        changes: GoalChanges,
    ) -> Result<(), Error>;

    /// Replace a goal's running balance.
    ///
    /// Callers are expected to go through
    /// [add_money_to_goal](crate::goal::add_money_to_goal), which clamps the
    /// balance into `0..=target_amount` first.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingGoal] if `id` does not refer to a goal
    /// owned by `account`.
    fn update_current_amount(
        &mut self,
        account: AccountId,
        id: GoalId,
        amount: Amount,
    ) -> Result<(), Error>;

    /// Delete a goal from the store.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingGoal] if `id` does not refer to a goal
    /// owned by `account`.
    fn delete(&mut self, account: AccountId, id: GoalId) -> Result<(), Error>;
}
