//! Defines the endpoint for deleting a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, auth::UserId, database_id::TransactionId, extract::Path,
    transaction::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction and reversing its history totals.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    user_id: UserId,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    match delete_transaction(&user_id, transaction_id, &connection) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(Error::DeleteMissingTransaction) => Err(Error::DeleteMissingTransaction),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            Err(error)
        }
    }
}
