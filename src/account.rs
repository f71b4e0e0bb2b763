//! Account scoping for store operations.
//!
//! Every store operation takes an explicit [AccountId] rather than relying
//! on ambient session state, so data belonging to different accounts never
//! mixes even when stores are shared. There is no authentication here; an
//! account is only a named scope.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The ID of a row in the account table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(i64);

impl AccountId {
    /// Create an account ID from a raw database ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw database ID.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl ToSql for AccountId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for AccountId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(AccountId)
    }
}

/// A named scope that owns a ledger, a budget set, and a goal list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The display name of the account.
    pub name: String,
}

/// Initialize the account table.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );",
    )?;

    Ok(())
}

/// Retrieve the account with `name`, creating it if it does not exist.
pub fn get_or_create_account(name: &str, connection: &Connection) -> Result<Account, Error> {
    let existing = connection
        .prepare("SELECT id, name FROM account WHERE name = :name;")?
        .query_row(&[(":name", &name)], map_row);

    match existing {
        Ok(account) => Ok(account),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            connection.execute("INSERT INTO account (name) VALUES (?1);", (name,))?;

            Ok(Account {
                id: AccountId::new(connection.last_insert_rowid()),
                name: name.to_owned(),
            })
        }
        Err(error) => Err(error.into()),
    }
}

fn map_row(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

#[cfg(test)]
mod account_tests {
    use rusqlite::Connection;

    use super::{create_account_table, get_or_create_account};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_account_table(&connection).expect("Could not create account table");
        connection
    }

    #[test]
    fn get_or_create_account_creates_missing_account() {
        let connection = get_test_db_connection();

        let account = get_or_create_account("personal", &connection).unwrap();

        assert!(account.id.as_i64() > 0);
        assert_eq!(account.name, "personal");
    }

    #[test]
    fn get_or_create_account_is_idempotent() {
        let connection = get_test_db_connection();

        let first = get_or_create_account("personal", &connection).unwrap();
        let second = get_or_create_account("personal", &connection).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn get_or_create_account_separates_names() {
        let connection = get_test_db_connection();

        let personal = get_or_create_account("personal", &connection).unwrap();
        let shared = get_or_create_account("shared", &connection).unwrap();

        assert_ne!(personal.id, shared.id);
    }
}
