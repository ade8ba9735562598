//! Whether money came in or went out.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether a transaction, category or daybook entry is money earned or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. sales.
    Income,
    /// Money spent, e.g. rent.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in the database and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The icon given to categories created without one.
    pub fn default_icon(&self) -> &'static str {
        match self {
            TransactionType::Income => "💰",
            TransactionType::Expense => "💸",
        }
    }

    /// Split `amount` into an (income, expense) pair according to this type.
    pub fn split_amount(&self, amount: f64) -> (f64, f64) {
        match self {
            TransactionType::Income => (amount, 0.0),
            TransactionType::Expense => (0.0, amount),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, transaction_type::TransactionType};

    #[test]
    fn parses_lowercase_names() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            "Income".parse::<TransactionType>(),
            Err(Error::InvalidTransactionType("Income".to_owned()))
        );
    }

    #[test]
    fn splits_amount_by_type() {
        assert_eq!(TransactionType::Income.split_amount(12.5), (12.5, 0.0));
        assert_eq!(TransactionType::Expense.split_amount(12.5), (0.0, 12.5));
    }

    #[test]
    fn serializes_as_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Expense).unwrap(),
            "\"expense\""
        );
    }
}
