//! Store-backed goal operations.

use crate::{
    AccountId, Amount, Error, GoalId,
    goal::Goal,
    stores::{GoalChanges, GoalStore, NewGoal},
};

/// Create a savings goal.
///
/// The target is normalized to its magnitude and the starting balance is
/// clamped into `0..=target_amount`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyGoalTitle] if the title is empty or whitespace,
/// - or any store error from writing the goal.
pub fn create_goal<G>(
    goal_store: &mut G,
    account: AccountId,
    mut new_goal: NewGoal,
) -> Result<Goal, Error>
where
    G: GoalStore,
{
    if new_goal.title.trim().is_empty() {
        return Err(Error::EmptyGoalTitle);
    }

    new_goal.target_amount = new_goal.target_amount.abs();
    new_goal.current_amount = new_goal
        .current_amount
        .clamp(Amount::ZERO, new_goal.target_amount);

    goal_store.create(account, new_goal)
}

/// Apply `changes` to a goal.
///
/// A changed target is normalized to its magnitude, and the balance is
/// re-clamped in case the target dropped below it.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyGoalTitle] if the change set contains an empty or
///   whitespace title,
/// - [Error::UpdateMissingGoal] if `id` does not refer to a goal owned by
///   `account`,
/// - or any other store error.
pub fn update_goal<G>(
    goal_store: &mut G,
    account: AccountId,
    id: GoalId,
    mut changes: GoalChanges,
) -> Result<Goal, Error>
where
    G: GoalStore,
{
    if let Some(title) = &changes.title {
        if title.trim().is_empty() {
            return Err(Error::EmptyGoalTitle);
        }
    }

    if let Some(target_amount) = changes.target_amount {
        changes.target_amount = Some(target_amount.abs());
    }

    goal_store.update(account, id, changes)?;

    let goal = goal_store.get(account, id)?;
    let clamped = goal.current_amount.clamp(Amount::ZERO, goal.target_amount);

    if clamped != goal.current_amount {
        goal_store.update_current_amount(account, id, clamped)?;
        return goal_store.get(account, id);
    }

    Ok(goal)
}

/// Add money to a goal's balance, clamped so it never exceeds the target.
///
/// A contribution larger than the remaining gap fills the goal exactly; a
/// negative contribution withdraws, clamped at zero.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a goal owned by `account`,
/// - or any other store error.
pub fn add_money_to_goal<G>(
    goal_store: &mut G,
    account: AccountId,
    id: GoalId,
    contribution: Amount,
) -> Result<Goal, Error>
where
    G: GoalStore,
{
    let goal = goal_store.get(account, id)?;

    let current_amount =
        (goal.current_amount + contribution).clamp(Amount::ZERO, goal.target_amount);

    goal_store.update_current_amount(account, id, current_amount)?;

    Ok(Goal {
        current_amount,
        ..goal
    })
}

#[cfg(test)]
mod goal_ops_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AccountId, Amount, Error,
        account::get_or_create_account,
        db::initialize,
        stores::{GoalChanges, GoalStore, NewGoal, SQLiteGoalStore},
    };

    use super::{add_money_to_goal, create_goal, update_goal};

    fn get_store_and_account() -> (SQLiteGoalStore, AccountId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let account = get_or_create_account("test", &connection)
            .expect("Could not create test account")
            .id;

        (
            SQLiteGoalStore::new(Arc::new(Mutex::new(connection))),
            account,
        )
    }

    fn new_goal(title: &str, target: f64) -> NewGoal {
        NewGoal {
            title: title.to_owned(),
            target_amount: Amount::from_major(target),
            current_amount: Amount::ZERO,
            deadline: date!(2026 - 12 - 31),
            color: "#3b82f6".to_owned(),
        }
    }

    #[test]
    fn create_goal_rejects_empty_title() {
        let (mut store, account) = get_store_and_account();

        let result = create_goal(&mut store, account, new_goal("  ", 1000.0));

        assert_eq!(result.unwrap_err(), Error::EmptyGoalTitle);
    }

    #[test]
    fn create_goal_clamps_starting_balance_to_target() {
        let (mut store, account) = get_store_and_account();

        let mut overfunded = new_goal("Holiday", 1000.0);
        overfunded.current_amount = Amount::from_major(1500.0);

        let goal = create_goal(&mut store, account, overfunded).unwrap();

        assert_eq!(goal.current_amount, Amount::from_major(1000.0));
    }

    #[test]
    fn contribution_increases_balance() {
        let (mut store, account) = get_store_and_account();
        let goal = create_goal(&mut store, account, new_goal("Holiday", 1000.0)).unwrap();

        let updated =
            add_money_to_goal(&mut store, account, goal.id, Amount::from_major(250.0)).unwrap();

        assert_eq!(updated.current_amount, Amount::from_major(250.0));
        // The persisted goal matches the returned one.
        assert_eq!(store.get(account, goal.id).unwrap(), updated);
    }

    #[test]
    fn contribution_larger_than_gap_fills_the_goal_exactly() {
        let (mut store, account) = get_store_and_account();
        let goal = create_goal(&mut store, account, new_goal("Holiday", 1000.0)).unwrap();

        add_money_to_goal(&mut store, account, goal.id, Amount::from_major(900.0)).unwrap();
        let updated =
            add_money_to_goal(&mut store, account, goal.id, Amount::from_major(500.0)).unwrap();

        assert_eq!(updated.current_amount, Amount::from_major(1000.0));
        assert!(updated.is_reached());
    }

    #[test]
    fn withdrawal_clamps_balance_at_zero() {
        let (mut store, account) = get_store_and_account();
        let goal = create_goal(&mut store, account, new_goal("Holiday", 1000.0)).unwrap();

        add_money_to_goal(&mut store, account, goal.id, Amount::from_major(100.0)).unwrap();
        let updated =
            add_money_to_goal(&mut store, account, goal.id, Amount::from_major(-300.0)).unwrap();

        assert_eq!(updated.current_amount, Amount::ZERO);
    }

    #[test]
    fn lowering_the_target_re_clamps_the_balance() {
        let (mut store, account) = get_store_and_account();
        let goal = create_goal(&mut store, account, new_goal("Holiday", 1000.0)).unwrap();
        add_money_to_goal(&mut store, account, goal.id, Amount::from_major(800.0)).unwrap();

        let changes = GoalChanges {
            target_amount: Some(Amount::from_major(500.0)),
            ..Default::default()
        };
        let updated = update_goal(&mut store, account, goal.id, changes).unwrap();

        assert_eq!(updated.target_amount, Amount::from_major(500.0));
        assert_eq!(updated.current_amount, Amount::from_major(500.0));
    }

    #[test]
    fn contribution_to_missing_goal_fails() {
        let (mut store, account) = get_store_and_account();

        let result = add_money_to_goal(&mut store, account, 999, Amount::from_major(10.0));

        assert_eq!(result, Err(Error::NotFound));
    }
}
