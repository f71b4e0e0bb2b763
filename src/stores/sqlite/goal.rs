//! Implements a SQLite backed goal store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter};

use crate::{
    AccountId, Amount, Error, GoalId,
    goal::Goal,
    stores::{GoalChanges, GoalStore, NewGoal},
};

/// Stores savings goals in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteGoalStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteGoalStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<Goal, rusqlite::Error> {
        Ok(Goal {
            id: row.get(0)?,
            title: row.get(1)?,
            target_amount: row.get(2)?,
            current_amount: row.get(3)?,
            deadline: row.get(4)?,
            color: row.get(5)?,
            account_id: row.get(6)?,
        })
    }
}

const GOAL_COLUMNS: &str =
    "id, title, target_cents, current_cents, deadline, color, account_id";

impl GoalStore for SQLiteGoalStore {
    /// Create a new goal in the database.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error, e.g. `account`
    /// does not exist in the database.
    fn create(&mut self, account: AccountId, new_goal: NewGoal) -> Result<Goal, Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        let goal = connection
            .prepare(&format!(
                "INSERT INTO goal (title, target_cents, current_cents, deadline, color, account_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {GOAL_COLUMNS}"
            ))?
            .query_row(
                (
                    &new_goal.title,
                    new_goal.target_amount,
                    new_goal.current_amount,
                    new_goal.deadline,
                    &new_goal.color,
                    account,
                ),
                Self::map_row,
            )?;

        Ok(goal)
    }

    /// Retrieve a goal in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a goal owned by
    ///   `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, account: AccountId, id: GoalId) -> Result<Goal, Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        let goal = connection
            .prepare(&format!(
                "SELECT {GOAL_COLUMNS} FROM goal WHERE id = ?1 AND account_id = ?2"
            ))?
            .query_row((id, account), Self::map_row)?;

        Ok(goal)
    }

    /// Retrieve all goals owned by `account`, ordered by deadline.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL
    /// error.
    fn get_all(&self, account: AccountId) -> Result<Vec<Goal>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .prepare(&format!(
                "SELECT {GOAL_COLUMNS} FROM goal WHERE account_id = ?1 ORDER BY deadline ASC"
            ))?
            .query_map((account,), Self::map_row)?
            .map(|maybe_goal| maybe_goal.map_err(Error::from))
            .collect()
    }

    /// Apply `changes` to an existing goal.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingGoal] if `id` does not refer to a goal owned
    ///   by `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &mut self,
        account: AccountId,
        id: GoalId,
        changes: GoalChanges,
    ) -> Result<(), Error> {
        let mut set_parts = Vec::new();
        let mut parameters: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(title) = changes.title {
            set_parts.push(format!("title = ?{}", parameters.len() + 1));
            parameters.push(Box::new(title));
        }

        if let Some(target_amount) = changes.target_amount {
            set_parts.push(format!("target_cents = ?{}", parameters.len() + 1));
            parameters.push(Box::new(target_amount));
        }

        if let Some(deadline) = changes.deadline {
            set_parts.push(format!("deadline = ?{}", parameters.len() + 1));
            parameters.push(Box::new(deadline));
        }

        if let Some(color) = changes.color {
            set_parts.push(format!("color = ?{}", parameters.len() + 1));
            parameters.push(Box::new(color));
        }

        if set_parts.is_empty() {
            // An empty change set still requires the goal to exist.
            return match self.get(account, id) {
                Ok(_) => Ok(()),
                Err(Error::NotFound) => Err(Error::UpdateMissingGoal),
                Err(error) => Err(error),
            };
        }

        let query_string = format!(
            "UPDATE goal SET {} WHERE id = ?{} AND account_id = ?{}",
            set_parts.join(", "),
            parameters.len() + 1,
            parameters.len() + 2,
        );
        parameters.push(Box::new(id));
        parameters.push(Box::new(account));

        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .execute(
                &query_string,
                params_from_iter(parameters.iter().map(|parameter| parameter.as_ref())),
            )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingGoal);
        }

        Ok(())
    }

    /// Replace a goal's running balance.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingGoal] if `id` does not refer to a goal owned
    ///   by `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update_current_amount(
        &mut self,
        account: AccountId,
        id: GoalId,
        amount: Amount,
    ) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .execute(
                "UPDATE goal SET current_cents = ?1 WHERE id = ?2 AND account_id = ?3",
                (amount, id, account),
            )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingGoal);
        }

        Ok(())
    }

    /// Delete a goal by ID.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingGoal] if `id` does not refer to a goal owned
    ///   by `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, account: AccountId, id: GoalId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .execute(
                "DELETE FROM goal WHERE id = ?1 AND account_id = ?2",
                (id, account),
            )?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingGoal);
        }

        Ok(())
    }
}

/// Initialize the goal table.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            target_cents INTEGER NOT NULL,
            current_cents INTEGER NOT NULL,
            deadline TEXT NOT NULL,
            color TEXT NOT NULL,
            account_id INTEGER NOT NULL,
            FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )?;

    Ok(())
}
