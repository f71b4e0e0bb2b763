//! Implements a SQLite backed transaction store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params_from_iter};

use crate::{
    AccountId, Error, TransactionId,
    stores::{
        TransactionStore,
        transaction::{SortOrder, TransactionQuery},
    },
    transaction::{Transaction, TransactionBuilder, TransactionChanges},
};

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction belongs to an
/// [Account](crate::account::Account), the account table must be set up in
/// the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
        let tags_json: String = row.get(8)?;
        let tags = serde_json::from_str(&tags_json).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                8,
                rusqlite::types::Type::Text,
                Box::new(error),
            )
        })?;

        Ok(Transaction {
            id: row.get(0)?,
            kind: row.get(1)?,
            amount: row.get(2)?,
            category: row.get(3)?,
            description: row.get(4)?,
            date: row.get(5)?,
            payment_method: row.get(6)?,
            tags,
            recurring: row.get(7)?,
            account_id: row.get(9)?,
        })
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, kind, amount_cents, category, description, date, payment_method, recurring, tags, account_id";

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is an SQL error, e.g. `account`
    /// does not exist in the database.
    fn create(
        &mut self,
        account: AccountId,
        builder: TransactionBuilder,
    ) -> Result<Transaction, Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        let tags_json = serde_json::to_string(&builder.tags)
            .map_err(|error| Error::JsonSerialization(error.to_string()))?;

        let transaction = connection
            .prepare(&format!(
                "INSERT INTO \"transaction\" (kind, amount_cents, category, description, date, payment_method, recurring, tags, account_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    builder.kind,
                    builder.amount,
                    &builder.category,
                    &builder.description,
                    builder.date,
                    &builder.payment_method,
                    builder.recurring,
                    tags_json,
                    account,
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction owned by
    ///   `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, account: AccountId, id: TransactionId) -> Result<Transaction, Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        let transaction = connection
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND account_id = ?2"
            ))?
            .query_row((id, account), Self::map_row)?;

        Ok(transaction)
    }

    /// Query for transactions in the database.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is an SQL
    /// error.
    fn get_query(
        &self,
        account: AccountId,
        query: TransactionQuery,
    ) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts = vec![format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE account_id = ?1"
        )];
        let mut query_parameters: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(account)];

        if let Some(date_range) = query.date_range {
            query_string_parts.push(format!(
                "AND date BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Box::new(*date_range.start()));
            query_parameters.push(Box::new(*date_range.end()));
        }

        match query.sort_date {
            Some(SortOrder::Ascending) => query_string_parts.push("ORDER BY date ASC".to_string()),
            Some(SortOrder::Descending) => {
                query_string_parts.push("ORDER BY date DESC".to_string())
            }
            None => {}
        }

        if let Some(limit) = query.limit {
            query_string_parts.push(format!("LIMIT {limit}"));
        }

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter().map(|parameter| parameter.as_ref()));

        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    /// Apply `changes` to an existing transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingTransaction] if `id` does not refer to a
    ///   transaction owned by `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(
        &mut self,
        account: AccountId,
        id: TransactionId,
        changes: TransactionChanges,
    ) -> Result<(), Error> {
        let mut set_parts = Vec::new();
        let mut parameters: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some((kind, amount)) = changes.kind_and_amount {
            set_parts.push(format!("kind = ?{}", parameters.len() + 1));
            parameters.push(Box::new(kind));
            set_parts.push(format!("amount_cents = ?{}", parameters.len() + 1));
            parameters.push(Box::new(amount.abs()));
        }

        if let Some(category) = changes.category {
            set_parts.push(format!("category = ?{}", parameters.len() + 1));
            parameters.push(Box::new(category));
        }

        if let Some(description) = changes.description {
            set_parts.push(format!("description = ?{}", parameters.len() + 1));
            parameters.push(Box::new(description));
        }

        if let Some(date) = changes.date {
            set_parts.push(format!("date = ?{}", parameters.len() + 1));
            parameters.push(Box::new(date));
        }

        if let Some(payment_method) = changes.payment_method {
            set_parts.push(format!("payment_method = ?{}", parameters.len() + 1));
            parameters.push(Box::new(payment_method));
        }

        if let Some(tags) = changes.tags {
            let tags_json = serde_json::to_string(&tags)
                .map_err(|error| Error::JsonSerialization(error.to_string()))?;
            set_parts.push(format!("tags = ?{}", parameters.len() + 1));
            parameters.push(Box::new(tags_json));
        }

        if let Some(recurring) = changes.recurring {
            set_parts.push(format!("recurring = ?{}", parameters.len() + 1));
            parameters.push(Box::new(recurring));
        }

        if set_parts.is_empty() {
            // An empty change set still requires the transaction to exist.
            return match self.get(account, id) {
                Ok(_) => Ok(()),
                Err(Error::NotFound) => Err(Error::UpdateMissingTransaction),
                Err(error) => Err(error),
            };
        }

        let query_string = format!(
            "UPDATE \"transaction\" SET {} WHERE id = ?{} AND account_id = ?{}",
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
            return Err(Error::UpdateMissingTransaction);
        }

        Ok(())
    }

    /// Delete a transaction by ID.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingTransaction] if `id` does not refer to a
    ///   transaction owned by `account`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, account: AccountId, id: TransactionId) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .execute(
                "DELETE FROM \"transaction\" WHERE id = ?1 AND account_id = ?2",
                (id, account),
            )?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingTransaction);
        }

        Ok(())
    }
}

/// Initialize the transaction table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            kind TEXT NOT NULL,
            amount_cents INTEGER NOT NULL,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            payment_method TEXT NOT NULL,
            recurring INTEGER NOT NULL,
            tags TEXT NOT NULL,
            account_id INTEGER NOT NULL,
            FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_account_date ON \"transaction\"(account_id, date);",
    )?;

    Ok(())
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        AccountId, Amount, Error,
        account::get_or_create_account,
        db::initialize,
        stores::{SortOrder, TransactionQuery, TransactionStore},
        transaction::{Transaction, TransactionChanges, TransactionKind},
    };

    use super::SQLiteTransactionStore;

    fn get_store_and_account() -> (SQLiteTransactionStore, AccountId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");

        let account = get_or_create_account("test", &connection)
            .expect("Could not create test account")
            .id;

        (
            SQLiteTransactionStore::new(Arc::new(Mutex::new(connection))),
            account,
        )
    }

    #[test]
    fn create_transaction_succeeds() {
        let (mut store, account) = get_store_and_account();

        let builder = Transaction::build(
            TransactionKind::Expense,
            Amount::from_major(12.50),
            date!(2024 - 01 - 15),
        )
        .category("Food")
        .description("Groceries")
        .payment_method("card")
        .tags(vec!["weekly".to_owned()]);

        let transaction = store.create(account, builder).unwrap();

        assert!(transaction.id > 0);
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.amount, Amount::from_major(12.50));
        assert_eq!(transaction.category, "Food");
        assert_eq!(transaction.description, "Groceries");
        assert_eq!(transaction.date, date!(2024 - 01 - 15));
        assert_eq!(transaction.payment_method, "card");
        assert_eq!(transaction.tags, vec!["weekly".to_owned()]);
        assert!(!transaction.recurring);
        assert_eq!(transaction.account_id, account);
    }

    #[test]
    fn get_transaction_roundtrips() {
        let (mut store, account) = get_store_and_account();

        let created = store
            .create(
                account,
                Transaction::build(
                    TransactionKind::Income,
                    Amount::from_major(1000.0),
                    date!(2024 - 01 - 01),
                )
                .category("Salary"),
            )
            .unwrap();

        let selected = store.get(account, created.id).unwrap();

        assert_eq!(created, selected);
    }

    #[test]
    fn get_transaction_with_invalid_id_returns_not_found() {
        let (store, account) = get_store_and_account();

        let result = store.get(account, 123);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_query_filters_by_date_range() {
        let (mut store, account) = get_store_and_account();

        for (amount, date) in [
            (10.0, date!(2024 - 01 - 15)),
            (20.0, date!(2024 - 02 - 15)),
            (30.0, date!(2024 - 03 - 15)),
        ] {
            store
                .create(
                    account,
                    Transaction::build(TransactionKind::Expense, Amount::from_major(amount), date)
                        .category("Food"),
                )
                .unwrap();
        }

        let query = TransactionQuery {
            date_range: Some(date!(2024 - 02 - 01)..=date!(2024 - 02 - 29)),
            ..Default::default()
        };
        let transactions = store.get_query(account, query).unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, Amount::from_major(20.0));
    }

    #[test]
    fn get_query_sorts_descending() {
        let (mut store, account) = get_store_and_account();

        for date in [
            date!(2024 - 01 - 15),
            date!(2024 - 03 - 15),
            date!(2024 - 02 - 15),
        ] {
            store
                .create(
                    account,
                    Transaction::build(TransactionKind::Expense, Amount::from_major(10.0), date)
                        .category("Food"),
                )
                .unwrap();
        }

        let query = TransactionQuery {
            sort_date: Some(SortOrder::Descending),
            ..Default::default()
        };
        let transactions = store.get_query(account, query).unwrap();

        let dates: Vec<_> = transactions.iter().map(|t| t.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 03 - 15),
                date!(2024 - 02 - 15),
                date!(2024 - 01 - 15)
            ]
        );
    }

    #[test]
    fn get_query_does_not_leak_other_accounts() {
        let (mut store, account) = get_store_and_account();

        store
            .create(
                account,
                Transaction::build(
                    TransactionKind::Expense,
                    Amount::from_major(10.0),
                    date!(2024 - 01 - 15),
                )
                .category("Food"),
            )
            .unwrap();

        let other_account = AccountId::new(account.as_i64() + 42);
        let transactions = store
            .get_query(other_account, TransactionQuery::default())
            .unwrap();

        assert!(transactions.is_empty());
    }

    #[test]
    fn update_transaction_changes_selected_fields() {
        let (mut store, account) = get_store_and_account();

        let created = store
            .create(
                account,
                Transaction::build(
                    TransactionKind::Expense,
                    Amount::from_major(50.0),
                    date!(2024 - 01 - 15),
                )
                .category("Food")
                .description("Groceries"),
            )
            .unwrap();

        let changes = TransactionChanges {
            category: Some("Transport".to_owned()),
            kind_and_amount: Some((TransactionKind::Expense, Amount::from_major(75.0))),
            ..Default::default()
        };
        store.update(account, created.id, changes).unwrap();

        let updated = store.get(account, created.id).unwrap();

        assert_eq!(updated.category, "Transport");
        assert_eq!(updated.amount, Amount::from_major(75.0));
        // Untouched fields keep their values.
        assert_eq!(updated.description, "Groceries");
        assert_eq!(updated.date, created.date);
    }

    #[test]
    fn update_transaction_with_invalid_id_fails() {
        let (mut store, account) = get_store_and_account();

        let changes = TransactionChanges {
            category: Some("Transport".to_owned()),
            ..Default::default()
        };
        let result = store.update(account, 999, changes);

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn update_transaction_with_empty_changes_checks_existence() {
        let (mut store, account) = get_store_and_account();

        let result = store.update(account, 999, TransactionChanges::default());

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_transaction_succeeds() {
        let (mut store, account) = get_store_and_account();

        let created = store
            .create(
                account,
                Transaction::build(
                    TransactionKind::Expense,
                    Amount::from_major(10.0),
                    date!(2024 - 01 - 15),
                )
                .category("Food"),
            )
            .unwrap();

        store.delete(account, created.id).unwrap();

        assert_eq!(store.get(account, created.id), Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_of_other_account_fails() {
        let (mut store, account) = get_store_and_account();

        let created = store
            .create(
                account,
                Transaction::build(
                    TransactionKind::Expense,
                    Amount::from_major(10.0),
                    date!(2024 - 01 - 15),
                )
                .category("Food"),
            )
            .unwrap();

        let other_account = AccountId::new(account.as_i64() + 42);
        let result = store.delete(other_account, created.id);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert!(store.get(account, created.id).is_ok());
    }
}
