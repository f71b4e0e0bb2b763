//! Implements a SQLite backed budget store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    AccountId, Amount, BudgetId, Error,
    budget::Budget,
    stores::{BudgetStore, NewBudget},
};

/// Stores budgets in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteBudgetStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteBudgetStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
        Ok(Budget {
            id: row.get(0)?,
            category: row.get(1)?,
            amount: row.get(2)?,
            spent: row.get(3)?,
            period: row.get(4)?,
            color: row.get(5)?,
            account_id: row.get(6)?,
        })
    }
}

const BUDGET_COLUMNS: &str = "id, category, amount_cents, spent_cents, period, color, account_id";

impl BudgetStore for SQLiteBudgetStore {
    /// Create a new budget in the database with the given initial `spent`
    /// total.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error, e.g. `account`
    /// does not exist in the database.
    fn create(
        &mut self,
        account: AccountId,
        new_budget: NewBudget,
        spent: Amount,
    ) -> Result<Budget, Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        let budget = connection
            .prepare(&format!(
                "INSERT INTO budget (category, amount_cents, spent_cents, period, color, account_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {BUDGET_COLUMNS}"
            ))?
            .query_row(
                (
                    &new_budget.category,
                    new_budget.amount,
                    spent,
                    new_budget.period,
                    &new_budget.color,
                    account,
                ),
                Self::map_row,
            )?;

        Ok(budget)
    }

    /// Retrieve a budget in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a budget owned by
    ///   `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, account: AccountId, id: BudgetId) -> Result<Budget, Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        let budget = connection
            .prepare(&format!(
                "SELECT {BUDGET_COLUMNS} FROM budget WHERE id = ?1 AND account_id = ?2"
            ))?
            .query_row((id, account), Self::map_row)?;

        Ok(budget)
    }

    /// Retrieve all budgets owned by `account`, ordered by category name.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL
    /// error.
    fn get_all(&self, account: AccountId) -> Result<Vec<Budget>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .prepare(&format!(
                "SELECT {BUDGET_COLUMNS} FROM budget WHERE account_id = ?1 ORDER BY category ASC"
            ))?
            .query_map((account,), Self::map_row)?
            .map(|maybe_budget| maybe_budget.map_err(Error::from))
            .collect()
    }

    /// Replace a budget's spending limit.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingBudget] if `id` does not refer to a budget
    ///   owned by `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update_amount(
        &mut self,
        account: AccountId,
        id: BudgetId,
        amount: Amount,
    ) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .execute(
                "UPDATE budget SET amount_cents = ?1 WHERE id = ?2 AND account_id = ?3",
                (amount, id, account),
            )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingBudget);
        }

        Ok(())
    }

    /// Replace a budget's derived `spent` total.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingBudget] if `id` does not refer to a budget
    ///   owned by `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update_spent(
        &mut self,
        account: AccountId,
        id: BudgetId,
        spent: Amount,
    ) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .execute(
                "UPDATE budget SET spent_cents = ?1 WHERE id = ?2 AND account_id = ?3",
                (spent, id, account),
            )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingBudget);
        }

        Ok(())
    }

    /// Delete a budget by ID.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingBudget] if `id` does not refer to a budget
    ///   owned by `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, account: AccountId, id: BudgetId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .execute(
                "DELETE FROM budget WHERE id = ?1 AND account_id = ?2",
                (id, account),
            )?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingBudget);
        }

        Ok(())
    }
}

/// Initialize the budget table and indexes.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            category TEXT NOT NULL,
            amount_cents INTEGER NOT NULL,
            spent_cents INTEGER NOT NULL,
            period TEXT NOT NULL,
            color TEXT NOT NULL,
            account_id INTEGER NOT NULL,
            FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_budget_account_category ON budget(account_id, category);",
    )?;

    Ok(())
}

#[cfg(test)]
mod sqlite_budget_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        AccountId, Amount, Error,
        account::get_or_create_account,
        budget::BudgetPeriod,
        db::initialize,
        stores::{BudgetStore, NewBudget},
    };

    use super::SQLiteBudgetStore;

    fn get_store_and_account() -> (SQLiteBudgetStore, AccountId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let account = get_or_create_account("test", &connection)
            .expect("Could not create test account")
            .id;

        (
            SQLiteBudgetStore::new(Arc::new(Mutex::new(connection))),
            account,
        )
    }

    fn new_budget(category: &str, amount: f64) -> NewBudget {
        NewBudget {
            category: category.to_owned(),
            amount: Amount::from_major(amount),
            period: BudgetPeriod::Monthly,
            color: "#22c55e".to_owned(),
        }
    }

    #[test]
    fn create_budget_stores_initial_spent() {
        let (mut store, account) = get_store_and_account();

        let budget = store
            .create(account, new_budget("Food", 500.0), Amount::from_major(50.0))
            .unwrap();

        assert!(budget.id > 0);
        assert_eq!(budget.category, "Food");
        assert_eq!(budget.amount, Amount::from_major(500.0));
        assert_eq!(budget.spent, Amount::from_major(50.0));
        assert_eq!(budget.period, BudgetPeriod::Monthly);
        assert_eq!(budget.account_id, account);
    }

    #[test]
    fn get_all_returns_only_own_budgets() {
        let (mut store, account) = get_store_and_account();

        store
            .create(account, new_budget("Food", 500.0), Amount::ZERO)
            .unwrap();
        store
            .create(account, new_budget("Transport", 150.0), Amount::ZERO)
            .unwrap();

        let budgets = store.get_all(account).unwrap();
        assert_eq!(budgets.len(), 2);

        let other_account = AccountId::new(account.as_i64() + 42);
        assert!(store.get_all(other_account).unwrap().is_empty());
    }

    #[test]
    fn update_amount_does_not_touch_spent() {
        let (mut store, account) = get_store_and_account();

        let budget = store
            .create(account, new_budget("Food", 500.0), Amount::from_major(75.0))
            .unwrap();

        store
            .update_amount(account, budget.id, Amount::from_major(600.0))
            .unwrap();

        let updated = store.get(account, budget.id).unwrap();
        assert_eq!(updated.amount, Amount::from_major(600.0));
        assert_eq!(updated.spent, Amount::from_major(75.0));
    }

    #[test]
    fn update_spent_persists() {
        let (mut store, account) = get_store_and_account();

        let budget = store
            .create(account, new_budget("Food", 500.0), Amount::ZERO)
            .unwrap();

        store
            .update_spent(account, budget.id, Amount::from_major(120.0))
            .unwrap();

        let updated = store.get(account, budget.id).unwrap();
        assert_eq!(updated.spent, Amount::from_major(120.0));
    }

    #[test]
    fn update_with_invalid_id_fails() {
        let (mut store, account) = get_store_and_account();

        assert_eq!(
            store.update_amount(account, 999, Amount::ZERO),
            Err(Error::UpdateMissingBudget)
        );
        assert_eq!(
            store.update_spent(account, 999, Amount::ZERO),
            Err(Error::UpdateMissingBudget)
        );
    }

    #[test]
    fn delete_budget_succeeds() {
        let (mut store, account) = get_store_and_account();

        let budget = store
            .create(account, new_budget("Food", 500.0), Amount::ZERO)
            .unwrap();

        store.delete(account, budget.id).unwrap();

        assert_eq!(store.get(account, budget.id), Err(Error::NotFound));
    }

    #[test]
    fn delete_budget_with_invalid_id_fails() {
        let (mut store, account) = get_store_and_account();

        assert_eq!(store.delete(account, 999), Err(Error::DeleteMissingBudget));
    }
}
