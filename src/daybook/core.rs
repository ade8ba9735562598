//! Defines the daybook entry model and database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, auth::UserId, database_id::DaybookEntryId, transaction_type::TransactionType,
};

/// Money received or paid out on a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaybookEntry {
    pub id: DaybookEntryId,
    pub description: String,
    #[serde(rename = "type")]
    pub entry_type: TransactionType,
    pub amount: f64,
    pub date: Date,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DaybookEntryForm {
    pub description: String,
    #[serde(rename = "type")]
    pub entry_type: TransactionType,
    pub amount: f64,
    pub date: Date,
}

/// Record an entry in the daybook of `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] if the description is blank,
/// - [Error::InvalidAmount] if the amount is not a positive, finite number,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_daybook_entry(
    user_id: &UserId,
    form: DaybookEntryForm,
    connection: &Connection,
) -> Result<DaybookEntry, Error> {
    let description = form.description.trim();
    if description.is_empty() {
        return Err(Error::EmptyField("description"));
    }

    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Err(Error::InvalidAmount(form.amount));
    }

    connection
        .prepare(
            "INSERT INTO daybook_entry (user_id, description, type, amount, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, description, type, amount, date",
        )?
        .query_row(
            (
                user_id.as_str(),
                description,
                form.entry_type,
                form.amount,
                form.date,
            ),
            map_entry_row,
        )
        .map_err(Error::from)
}

/// Retrieve the daybook entries of `user_id`, newest day first and in the
/// order they were recorded within a day.
///
/// Either bound may be left open.
pub fn get_daybook_entries(
    user_id: &UserId,
    from: Option<Date>,
    to: Option<Date>,
    connection: &Connection,
) -> Result<Vec<DaybookEntry>, Error> {
    connection
        .prepare(
            "SELECT id, description, type, amount, date FROM daybook_entry
             WHERE user_id = ?1
                AND (?2 IS NULL OR date >= ?2)
                AND (?3 IS NULL OR date <= ?3)
             ORDER BY date DESC, id ASC",
        )?
        .query_map((user_id.as_str(), from, to), map_entry_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Delete the entry `id` of `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingDaybookEntry] if the user has no such entry.
pub fn delete_daybook_entry(
    user_id: &UserId,
    id: DaybookEntryId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM daybook_entry WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingDaybookEntry);
    }

    Ok(())
}

pub fn create_daybook_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS daybook_entry (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            description TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            amount REAL NOT NULL,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_daybook_entry_user_date ON daybook_entry(user_id, date);",
    )?;

    Ok(())
}

fn map_entry_row(row: &Row) -> Result<DaybookEntry, rusqlite::Error> {
    Ok(DaybookEntry {
        id: row.get(0)?,
        description: row.get(1)?,
        entry_type: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserId,
        daybook::{
            DaybookEntryForm, create_daybook_entry, delete_daybook_entry, get_daybook_entries,
        },
        db::initialize,
        transaction_type::TransactionType,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn form(description: &str, amount: f64, date: time::Date) -> DaybookEntryForm {
        DaybookEntryForm {
            description: description.to_owned(),
            entry_type: TransactionType::Income,
            amount,
            date,
        }
    }

    #[test]
    fn entries_are_newest_day_first_within_bounds() {
        let conn = get_test_connection();
        let user = UserId::new("user_1");
        for (description, date) in [
            ("a", date!(2025 - 01 - 01)),
            ("b", date!(2025 - 01 - 02)),
            ("c", date!(2025 - 01 - 02)),
            ("d", date!(2025 - 01 - 03)),
        ] {
            create_daybook_entry(&user, form(description, 1.0, date), &conn).unwrap();
        }

        let entries =
            get_daybook_entries(&user, Some(date!(2025 - 01 - 02)), None, &conn).unwrap();

        let descriptions: Vec<&str> = entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, ["d", "b", "c"]);
    }

    #[test]
    fn blank_description_is_rejected() {
        let conn = get_test_connection();

        let result = create_daybook_entry(
            &UserId::new("user_1"),
            form("", 1.0, date!(2025 - 01 - 01)),
            &conn,
        );

        assert_eq!(result, Err(Error::EmptyField("description")));
    }

    #[test]
    fn delete_is_scoped_to_user() {
        let conn = get_test_connection();
        let entry = create_daybook_entry(
            &UserId::new("user_1"),
            form("cash sale", 1.0, date!(2025 - 01 - 01)),
            &conn,
        )
        .unwrap();

        assert_eq!(
            delete_daybook_entry(&UserId::new("user_2"), entry.id, &conn),
            Err(Error::DeleteMissingDaybookEntry)
        );
    }
}
