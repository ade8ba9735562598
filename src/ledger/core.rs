//! Defines the ledger models, running balances and database queries.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserId, database_id::LedgerEntryId};

/// Whether an entry adds to or takes from its ledger's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Credit,
    Debit,
}

impl EntryKind {
    fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Credit => "credit",
            EntryKind::Debit => "debit",
        }
    }

    /// `amount` with the sign it has on the balance.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            EntryKind::Credit => amount,
            EntryKind::Debit => -amount,
        }
    }
}

impl Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(EntryKind::Credit),
            "debit" => Ok(EntryKind::Debit),
            other => Err(format!("invalid ledger entry kind \"{other}\"")),
        }
    }
}

impl ToSql for EntryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for EntryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A single credit or debit in a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    /// The name of the ledger the entry belongs to, e.g. "Bank".
    pub ledger: String,
    pub description: String,
    pub kind: EntryKind,
    pub amount: f64,
    pub date: Date,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerEntryForm {
    pub ledger: String,
    #[serde(default)]
    pub description: String,
    pub kind: EntryKind,
    pub amount: f64,
    pub date: Date,
}

/// A ledger entry with the balance of its ledger after the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntryView {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    pub balance: f64,
}

/// Credit and debit totals of one ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub ledger: String,
    pub credit: f64,
    pub debit: f64,
    pub balance: f64,
}

/// Add an entry to a ledger of `user_id`. Ledgers exist as soon as they have
/// an entry.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] if the ledger name is blank,
/// - [Error::InvalidAmount] if the amount is not a positive, finite number,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_ledger_entry(
    user_id: &UserId,
    form: LedgerEntryForm,
    connection: &Connection,
) -> Result<LedgerEntry, Error> {
    let ledger = form.ledger.trim();
    if ledger.is_empty() {
        return Err(Error::EmptyField("ledger"));
    }

    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Err(Error::InvalidAmount(form.amount));
    }

    connection
        .prepare(
            "INSERT INTO ledger_entry (user_id, ledger, description, kind, amount, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, ledger, description, kind, amount, date",
        )?
        .query_row(
            (
                user_id.as_str(),
                ledger,
                form.description.trim(),
                form.kind,
                form.amount,
                form.date,
            ),
            map_entry_row,
        )
        .map_err(Error::from)
}

/// Retrieve the ledger entries of `user_id` in the order they were booked,
/// optionally from a single ledger.
pub fn get_ledger_entries(
    user_id: &UserId,
    ledger: Option<&str>,
    connection: &Connection,
) -> Result<Vec<LedgerEntry>, Error> {
    connection
        .prepare(
            "SELECT id, ledger, description, kind, amount, date FROM ledger_entry
             WHERE user_id = ?1 AND (?2 IS NULL OR ledger = ?2)
             ORDER BY date ASC, id ASC",
        )?
        .query_map((user_id.as_str(), ledger), map_entry_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Pair each entry with the balance of its own ledger after that entry.
///
/// `entries` must be in booking order, as returned by [get_ledger_entries].
pub fn with_running_balances(entries: Vec<LedgerEntry>) -> Vec<LedgerEntryView> {
    let mut balances: HashMap<String, f64> = HashMap::new();

    entries
        .into_iter()
        .map(|entry| {
            let balance = balances.entry(entry.ledger.clone()).or_insert(0.0);
            *balance += entry.kind.signed(entry.amount);

            LedgerEntryView {
                balance: *balance,
                entry,
            }
        })
        .collect()
}

/// Total credits and debits per ledger of `user_id`, ordered by ledger name.
pub fn get_ledger_summaries(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<LedgerSummary>, Error> {
    connection
        .prepare(
            "SELECT
                ledger,
                COALESCE(SUM(CASE WHEN kind = 'credit' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN kind = 'debit' THEN amount END), 0)
             FROM ledger_entry
             WHERE user_id = ?1
             GROUP BY ledger
             ORDER BY ledger ASC",
        )?
        .query_map([user_id.as_str()], |row| {
            let credit: f64 = row.get(1)?;
            let debit: f64 = row.get(2)?;

            Ok(LedgerSummary {
                ledger: row.get(0)?,
                credit,
                debit,
                balance: credit - debit,
            })
        })?
        .map(|maybe_summary| maybe_summary.map_err(Error::from))
        .collect()
}

/// Delete the entry `id` of `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingLedgerEntry] if the user has no such entry.
pub fn delete_ledger_entry(
    user_id: &UserId,
    id: LedgerEntryId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM ledger_entry WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingLedgerEntry);
    }

    Ok(())
}

pub fn create_ledger_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS ledger_entry (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            ledger TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            kind TEXT NOT NULL CHECK (kind IN ('credit', 'debit')),
            amount REAL NOT NULL,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_ledger_entry_user_ledger ON ledger_entry(user_id, ledger);",
    )?;

    Ok(())
}

fn map_entry_row(row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        ledger: row.get(1)?,
        description: row.get(2)?,
        kind: row.get(3)?,
        amount: row.get(4)?,
        date: row.get(5)?,
    })
}
