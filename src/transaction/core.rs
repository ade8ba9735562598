//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserId,
    category::resolve_category,
    database_id::TransactionId,
    date_range::DateRange,
    history::add_to_history,
    transaction_type::TransactionType,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction, always positive.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The name of the category at the time the transaction was created.
    pub category: String,
    /// The icon of the category at the time the transaction was created.
    pub category_icon: String,
}

/// The details of a transaction that has not been saved yet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTransaction {
    pub amount: f64,
    /// Name of an existing category of the same type, or a bank or ledger
    /// category that will be created on first use.
    pub category: String,
    pub date: Date,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub description: String,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Save a transaction and add its amount to the caller's day and month totals.
///
/// The category is looked up by name and type, see [resolve_category]. Creating
/// the category, inserting the transaction and updating both history tables
/// happen in a single SQL transaction, so either all of the writes are saved
/// or none are.
///
/// The date is not checked against the current date, that is left to the caller.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is not a positive, finite number,
/// - [Error::EmptyField] if the category name is blank,
/// - [Error::CategoryNotFound] if the category does not exist and cannot be created automatically,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: &UserId,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let NewTransaction {
        amount,
        category,
        date,
        transaction_type,
        description,
    } = new_transaction;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount(amount));
    }

    let category_name = category.trim();
    if category_name.is_empty() {
        return Err(Error::EmptyField("category"));
    }

    let sql_transaction = connection.unchecked_transaction()?;

    let category = resolve_category(user_id, category_name, transaction_type, &sql_transaction)?;

    let transaction = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, amount, description, date, type, category, category_icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, amount, description, date, type, category, category_icon",
        )?
        .query_row(
            (
                user_id.as_str(),
                amount,
                description.trim(),
                date,
                transaction_type,
                category.name.as_ref(),
                &category.icon,
            ),
            map_transaction_row,
        )?;

    add_to_history(user_id, date, transaction_type, amount, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Delete a transaction and take its amount back off the caller's day and
/// month totals, in a single SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if the caller has no transaction with `id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    user_id: &UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let deleted: Option<(f64, Date, TransactionType)> = sql_transaction
        .prepare(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2
             RETURNING amount, date, type",
        )?
        .query_row((id, user_id.as_str()), |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .optional()?;

    let Some((amount, date, transaction_type)) = deleted else {
        return Err(Error::DeleteMissingTransaction);
    };

    add_to_history(user_id, date, transaction_type, -amount, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}

/// Retrieve the caller's transactions dated within `range`, newest first.
pub fn get_transactions(
    user_id: &UserId,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, amount, description, date, type, category, category_icon
             FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date DESC, id DESC",
        )?
        .query_map((user_id.as_str(), range.from, range.to), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL,
                category_icon TEXT NOT NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let description = row.get(2)?;
    let date = row.get(3)?;
    let transaction_type = row.get(4)?;
    let category = row.get(5)?;
    let category_icon = row.get(6)?;

    Ok(Transaction {
        id,
        amount,
        description,
        date,
        transaction_type,
        category,
        category_icon,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserId,
        category::{CategoryName, create_category, find_category},
        date_range::DateRange,
        db::initialize,
        history::{get_month_history, get_year_history},
        transaction::{
            NewTransaction, count_transactions, create_transaction, delete_transaction,
            get_transactions,
        },
        transaction_type::TransactionType,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn user() -> UserId {
        UserId::new("user_1")
    }

    fn new_transaction(
        amount: f64,
        category: &str,
        date: time::Date,
        transaction_type: TransactionType,
    ) -> NewTransaction {
        NewTransaction {
            amount,
            category: category.to_owned(),
            date,
            transaction_type,
            description: String::new(),
        }
    }

    #[track_caller]
    fn create_test_category(name: &str, icon: &str, transaction_type: TransactionType, conn: &Connection) {
        create_category(
            &user(),
            CategoryName::new_unchecked(name),
            icon,
            transaction_type,
            conn,
        )
        .unwrap();
    }

    /// (income, expense) for the day and for the month of `date`.
    #[track_caller]
    fn history_totals(date: time::Date, conn: &Connection) -> ((f64, f64), (f64, f64)) {
        let days = get_month_history(&user(), date.year(), date.month().into(), conn).unwrap();
        let months = get_year_history(&user(), date.year(), conn).unwrap();
        let day = &days[usize::from(date.day()) - 1];
        let month = &months[usize::from(u8::from(date.month())) - 1];

        ((day.income, day.expense), (month.income, month.expense))
    }

    #[test]
    fn create_denormalizes_category_and_updates_history() {
        let conn = get_test_connection();
        create_test_category("Sales", "🛒", TransactionType::Income, &conn);
        let date = date!(2025 - 04 - 09);

        let transaction = create_transaction(
            &user(),
            new_transaction(120.5, "Sales", date, TransactionType::Income),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.category, "Sales");
        assert_eq!(transaction.category_icon, "🛒");
        assert_eq!(transaction.amount, 120.5);
        assert_eq!(count_transactions(&conn).unwrap(), 1);
        assert_eq!(history_totals(date, &conn), ((120.5, 0.0), (120.5, 0.0)));
    }

    #[test]
    fn repeated_creates_increment_history() {
        let conn = get_test_connection();
        create_test_category("Rent", "🏠", TransactionType::Expense, &conn);
        create_test_category("Sales", "", TransactionType::Income, &conn);
        let first = date!(2025 - 04 - 09);
        let second = date!(2025 - 04 - 20);

        for (amount, category, date, transaction_type) in [
            (100.0, "Rent", first, TransactionType::Expense),
            (25.0, "Rent", first, TransactionType::Expense),
            (40.0, "Sales", second, TransactionType::Income),
        ] {
            create_transaction(
                &user(),
                new_transaction(amount, category, date, transaction_type),
                &conn,
            )
            .unwrap();
        }

        assert_eq!(history_totals(first, &conn), ((0.0, 125.0), (40.0, 125.0)));
        assert_eq!(history_totals(second, &conn), ((40.0, 0.0), (40.0, 125.0)));
    }

    #[test]
    fn create_auto_provisions_bank_category() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            &user(),
            new_transaction(10.0, "Bank Transfer", date!(2025 - 01 - 01), TransactionType::Income),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.category_icon, "💰");
        assert!(
            find_category(&user(), "Bank Transfer", TransactionType::Income, &conn)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn create_with_missing_category_writes_nothing() {
        let conn = get_test_connection();
        let date = date!(2025 - 01 - 01);

        let result = create_transaction(
            &user(),
            new_transaction(10.0, "Groceries", date, TransactionType::Expense),
            &conn,
        );

        assert_eq!(result, Err(Error::CategoryNotFound("Groceries".to_owned())));
        assert_eq!(count_transactions(&conn).unwrap(), 0);
        assert_eq!(history_totals(date, &conn), ((0.0, 0.0), (0.0, 0.0)));
    }

    #[test]
    fn category_of_other_type_is_not_used() {
        let conn = get_test_connection();
        create_test_category("Refunds", "", TransactionType::Income, &conn);

        let result = create_transaction(
            &user(),
            new_transaction(10.0, "Refunds", date!(2025 - 01 - 01), TransactionType::Expense),
            &conn,
        );

        assert_eq!(result, Err(Error::CategoryNotFound("Refunds".to_owned())));
    }

    #[test]
    fn create_auto_provisions_long_bank_category_name() {
        let conn = get_test_connection();
        let name = "HDFC Bank current account 0012345678";
        let date = date!(2025 - 02 - 14);

        let transaction = create_transaction(
            &user(),
            new_transaction(250.0, name, date, TransactionType::Income),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.category, name);
        assert_eq!(transaction.category_icon, "💰");
        assert!(
            find_category(&user(), name, TransactionType::Income, &conn)
                .unwrap()
                .is_some()
        );
        assert_eq!(history_totals(date, &conn), ((250.0, 0.0), (250.0, 0.0)));
    }

    #[test]
    fn failed_history_update_rolls_back_every_write() {
        let conn = get_test_connection();
        conn.execute_batch(
            "CREATE TRIGGER fail_year_history BEFORE INSERT ON year_history
             BEGIN SELECT RAISE(ABORT, 'year history unavailable'); END;",
        )
        .unwrap();
        let date = date!(2025 - 06 - 30);

        let result = create_transaction(
            &user(),
            new_transaction(99.0, "Cash Ledger", date, TransactionType::Income),
            &conn,
        );

        assert!(matches!(result, Err(Error::SqlError(_))));
        assert_eq!(count_transactions(&conn).unwrap(), 0);
        assert_eq!(
            find_category(&user(), "Cash Ledger", TransactionType::Income, &conn).unwrap(),
            None
        );
        let month_rows: u32 = conn
            .query_row("SELECT COUNT(*) FROM month_history", [], |row| row.get(0))
            .unwrap();
        assert_eq!(month_rows, 0);
    }

    #[test]
    fn create_rejects_invalid_amounts() {
        let conn = get_test_connection();
        let date = date!(2025 - 01 - 01);

        for amount in [0.0, -5.0, f64::INFINITY] {
            let result = create_transaction(
                &user(),
                new_transaction(amount, "Bank", date, TransactionType::Income),
                &conn,
            );

            assert_eq!(result, Err(Error::InvalidAmount(amount)));
        }
        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn create_rejects_blank_category() {
        let conn = get_test_connection();

        let result = create_transaction(
            &user(),
            new_transaction(5.0, "  ", date!(2025 - 01 - 01), TransactionType::Income),
            &conn,
        );

        assert_eq!(result, Err(Error::EmptyField("category")));
    }

    #[test]
    fn delete_restores_history() {
        let conn = get_test_connection();
        let date = date!(2025 - 02 - 10);
        create_transaction(
            &user(),
            new_transaction(30.0, "Bank", date, TransactionType::Expense),
            &conn,
        )
        .unwrap();
        let transaction = create_transaction(
            &user(),
            new_transaction(12.5, "Bank", date, TransactionType::Expense),
            &conn,
        )
        .unwrap();

        delete_transaction(&user(), transaction.id, &conn).unwrap();

        assert_eq!(count_transactions(&conn).unwrap(), 1);
        assert_eq!(history_totals(date, &conn), ((0.0, 30.0), (0.0, 30.0)));
    }

    #[test]
    fn delete_other_users_transaction_fails() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            &user(),
            new_transaction(30.0, "Bank", date!(2025 - 02 - 10), TransactionType::Expense),
            &conn,
        )
        .unwrap();

        let result = delete_transaction(&UserId::new("user_2"), transaction.id, &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(count_transactions(&conn).unwrap(), 1);
    }

    #[test]
    fn list_returns_range_newest_first() {
        let conn = get_test_connection();
        for (amount, date) in [
            (1.0, date!(2025 - 01 - 31)),
            (2.0, date!(2025 - 02 - 01)),
            (3.0, date!(2025 - 02 - 15)),
            (4.0, date!(2025 - 03 - 01)),
        ] {
            create_transaction(
                &user(),
                new_transaction(amount, "Bank", date, TransactionType::Income),
                &conn,
            )
            .unwrap();
        }

        let transactions = get_transactions(
            &user(),
            DateRange {
                from: date!(2025 - 02 - 01),
                to: date!(2025 - 02 - 28),
            },
            &conn,
        )
        .unwrap();

        let amounts: Vec<f64> = transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, [3.0, 2.0]);
    }
}
