//! Implements a struct that holds the state of a tracker session.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    db::initialize,
    stores::{BudgetStore, GoalStore, TransactionStore},
    timezone,
};

/// The state of a tracker session: the shared database connection, the
/// stores, and the timezone used to anchor "the current month".
#[derive(Debug, Clone)]
pub struct AppState<T, B, G>
where
    T: TransactionStore,
    B: BudgetStore,
    G: GoalStore,
{
    /// The local timezone as a canonical timezone name, e.g.
    /// "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection shared by the stores.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The store for managing [transactions](crate::transaction::Transaction).
    pub transaction_store: T,
    /// The store for managing [budgets](crate::budget::Budget).
    pub budget_store: B,
    /// The store for managing [goals](crate::goal::Goal).
    pub goal_store: G,
}

impl<T, B, G> AppState<T, B, G>
where
    T: TransactionStore,
    B: BudgetStore,
    G: GoalStore,
{
    /// Create a new [AppState].
    ///
    /// This function will initialize the database by adding the tables for
    /// the domain models. `local_timezone` should be a valid, canonical
    /// timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
        transaction_store: T,
        budget_store: B,
        goal_store: G,
    ) -> Result<Self, Error> {
        {
            let connection = db_connection.lock().map_err(|_| Error::DatabaseLock)?;
            initialize(&connection)?;
        }

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            db_connection,
            transaction_store,
            budget_store,
            goal_store,
        })
    }

    /// The current calendar date in the session's timezone.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the session's timezone name is
    /// not a known timezone.
    pub fn today(&self) -> Result<Date, Error> {
        timezone::today_in(&self.local_timezone)
    }
}

#[cfg(test)]
mod app_state_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        stores::{SQLiteBudgetStore, SQLiteGoalStore, SQLiteTransactionStore},
    };

    use super::AppState;

    fn get_app_state(
        timezone: &str,
    ) -> Result<AppState<SQLiteTransactionStore, SQLiteBudgetStore, SQLiteGoalStore>, Error> {
        let connection = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));

        AppState::new(
            timezone,
            connection.clone(),
            SQLiteTransactionStore::new(connection.clone()),
            SQLiteBudgetStore::new(connection.clone()),
            SQLiteGoalStore::new(connection),
        )
    }

    #[test]
    fn new_initializes_the_database() {
        let state = get_app_state("Etc/UTC").unwrap();

        let connection = state.db_connection.lock().unwrap();
        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('account', 'transaction', 'budget', 'goal')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 4);
    }

    #[test]
    fn today_fails_on_unknown_timezone() {
        let state = get_app_state("Not/AZone").unwrap();

        assert_eq!(
            state.today(),
            Err(Error::InvalidTimezone("Not/AZone".to_owned()))
        );
    }
}
