//! Database schema initialization.

use rusqlite::Connection;

use crate::{
    Error, account,
    stores::sqlite::{create_budget_table, create_goal_table, create_transaction_table},
};

/// Create the tables for the domain models on `connection`.
///
/// Safe to call on an already initialized database.
///
/// # Errors
/// Returns an [Error::SqlError] if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    account::create_account_table(connection)?;
    create_transaction_table(connection)?;
    create_budget_table(connection)?;
    create_goal_table(connection)?;

    Ok(())
}

#[cfg(test)]
mod db_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

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
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");
        initialize(&connection).expect("Second initialization should succeed");
    }
}
