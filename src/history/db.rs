//! Database operations for the month and year history aggregates.

use std::collections::HashMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Error, auth::UserId, transaction_type::TransactionType};

/// Income and expense totals for one day or one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub year: i32,
    /// 1 for January through 12 for December.
    pub month: u8,
    /// Only set for rows of a month's history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    pub income: f64,
    pub expense: f64,
}

/// Initialize the month_history and year_history tables.
pub fn create_history_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS month_history (
            user_id TEXT NOT NULL,
            day INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            income REAL NOT NULL DEFAULT 0,
            expense REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (day, month, year, user_id)
        );

        CREATE TABLE IF NOT EXISTS year_history (
            user_id TEXT NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            income REAL NOT NULL DEFAULT 0,
            expense REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (month, year, user_id)
        );",
    )?;

    Ok(())
}

/// Add `amount` to the income or expense total of the day and of the month
/// containing `date`, creating the rows on first use.
///
/// A negative `amount` takes it back off, e.g. when a transaction is deleted.
/// Callers are expected to run this inside the same SQL transaction as the
/// write it accounts for.
pub fn add_to_history(
    user_id: &UserId,
    date: Date,
    transaction_type: TransactionType,
    amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let (income, expense) = transaction_type.split_amount(amount);
    let month = u8::from(date.month());

    connection.execute(
        "INSERT INTO month_history (user_id, day, month, year, income, expense)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(day, month, year, user_id) DO UPDATE SET
            income = income + excluded.income,
            expense = expense + excluded.expense",
        (
            user_id.as_str(),
            date.day(),
            month,
            date.year(),
            income,
            expense,
        ),
    )?;

    connection.execute(
        "INSERT INTO year_history (user_id, month, year, income, expense)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(month, year, user_id) DO UPDATE SET
            income = income + excluded.income,
            expense = expense + excluded.expense",
        (user_id.as_str(), month, date.year(), income, expense),
    )?;

    Ok(())
}

/// The years that have any history for `user_id`, oldest first.
pub fn get_history_periods(user_id: &UserId, connection: &Connection) -> Result<Vec<i32>, Error> {
    connection
        .prepare("SELECT DISTINCT year FROM year_history WHERE user_id = ?1 ORDER BY year ASC")?
        .query_map([user_id.as_str()], |row| row.get(0))?
        .map(|maybe_year| maybe_year.map_err(Error::from))
        .collect()
}

/// The totals for each month of `year`, January first, with zeros for months
/// without any transactions.
pub fn get_year_history(
    user_id: &UserId,
    year: i32,
    connection: &Connection,
) -> Result<Vec<HistoryRow>, Error> {
    let mut totals: HashMap<u8, (f64, f64)> = connection
        .prepare(
            "SELECT month, income, expense FROM year_history WHERE user_id = ?1 AND year = ?2",
        )?
        .query_map((user_id.as_str(), year), |row| {
            Ok((row.get(0)?, (row.get(1)?, row.get(2)?)))
        })?
        .collect::<Result<_, _>>()?;

    let rows = (1..=12)
        .map(|month| {
            let (income, expense) = totals.remove(&month).unwrap_or_default();

            HistoryRow {
                year,
                month,
                day: None,
                income,
                expense,
            }
        })
        .collect();

    Ok(rows)
}

/// The totals for each day of `month` in `year`, with zeros for days without
/// any transactions.
///
/// # Errors
/// Returns [Error::InvalidMonth] if `month` is not in 1..=12.
pub fn get_month_history(
    user_id: &UserId,
    year: i32,
    month: u8,
    connection: &Connection,
) -> Result<Vec<HistoryRow>, Error> {
    let Ok(calendar_month) = Month::try_from(month) else {
        return Err(Error::InvalidMonth(month));
    };

    let mut totals: HashMap<u8, (f64, f64)> = connection
        .prepare(
            "SELECT day, income, expense FROM month_history
             WHERE user_id = ?1 AND year = ?2 AND month = ?3",
        )?
        .query_map((user_id.as_str(), year, month), |row| {
            Ok((row.get(0)?, (row.get(1)?, row.get(2)?)))
        })?
        .collect::<Result<_, _>>()?;

    let rows = (1..=days_in_month(year, calendar_month))
        .map(|day| {
            let (income, expense) = totals.remove(&day).unwrap_or_default();

            HistoryRow {
                year,
                month,
                day: Some(day),
                income,
                expense,
            }
        })
        .collect();

    Ok(rows)
}

fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::February if time::util::is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}
