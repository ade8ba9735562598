//! Defines the endpoint for listing transactions.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserId,
    extract::{Json, Query},
    date_range::DateRangeQuery,
    timezone::local_today,
    transaction::{Transaction, get_transactions},
    user_settings::{format_amount, get_currency},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A transaction with its amount rendered in the user's currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    /// E.g. "$1,234.50".
    pub formatted_amount: String,
}

/// A route handler that responds with the caller's transactions in a date
/// range, newest first.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    user_id: UserId,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<TransactionView>>, Error> {
    let range = query.resolve(local_today(&state.local_timezone)?)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let currency = get_currency(&user_id, &connection)?;
    let transactions = get_transactions(&user_id, range, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let views = transactions
        .into_iter()
        .map(|transaction| TransactionView {
            formatted_amount: format_amount(transaction.amount, currency),
            transaction,
        })
        .collect();

    Ok(Json(views))
}
