//! Route handlers for the ledger API.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserId,
    extract::{Json, Path, Query},
    database_id::LedgerEntryId,
    ledger::{
        LedgerEntry, LedgerEntryForm, LedgerEntryView, LedgerSummary, create_ledger_entry,
        delete_ledger_entry, get_ledger_entries, get_ledger_summaries, with_running_balances,
    },
};

/// The state needed for the ledger endpoints.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LedgerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// Only list the entries of this ledger.
    pub ledger: Option<String>,
}

pub async fn get_ledger_entries_endpoint(
    State(state): State<LedgerState>,
    user_id: UserId,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<LedgerEntryView>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entries = get_ledger_entries(&user_id, query.ledger.as_deref(), &connection)?;

    Ok(Json(with_running_balances(entries)))
}

pub async fn get_ledger_summary_endpoint(
    State(state): State<LedgerState>,
    user_id: UserId,
) -> Result<Json<Vec<LedgerSummary>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_ledger_summaries(&user_id, &connection).map(Json)
}

pub async fn create_ledger_entry_endpoint(
    State(state): State<LedgerState>,
    user_id: UserId,
    Json(form): Json<LedgerEntryForm>,
) -> Result<(StatusCode, Json<LedgerEntry>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entry = create_ledger_entry(&user_id, form, &connection)?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_ledger_entry_endpoint(
    State(state): State<LedgerState>,
    user_id: UserId,
    Path(entry_id): Path<LedgerEntryId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_ledger_entry(&user_id, entry_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        ledger::{LedgerEntry, LedgerEntryView},
        test_utils::{create_token, get_test_server},
    };

    #[tokio::test]
    async fn filtered_listing_carries_running_balance() {
        let server = get_test_server();
        let token = create_token("user_1");
        for body in [
            json!({ "ledger": "Bank", "kind": "credit", "amount": 500, "date": "2025-01-01" }),
            json!({ "ledger": "Expense", "kind": "debit", "amount": 20, "date": "2025-01-02" }),
            json!({ "ledger": "Bank", "kind": "debit", "amount": 120, "date": "2025-01-03" }),
        ] {
            server
                .post("/api/ledger")
                .authorization_bearer(&token)
                .json(&body)
                .await
                .assert_status(StatusCode::CREATED);
        }

        let entries = server
            .get("/api/ledger")
            .add_query_param("ledger", "Bank")
            .authorization_bearer(&token)
            .await
            .json::<Vec<LedgerEntryView>>();

        let balances: Vec<f64> = entries.iter().map(|view| view.balance).collect();
        assert_eq!(balances, [500.0, 380.0]);
    }

    #[tokio::test]
    async fn summary_and_delete() {
        let server = get_test_server();
        let token = create_token("user_1");
        let entry = server
            .post("/api/ledger")
            .authorization_bearer(&token)
            .json(&json!({ "ledger": "Bank", "kind": "credit", "amount": 50, "date": "2025-01-01" }))
            .await
            .json::<LedgerEntry>();

        server
            .get("/api/ledger/summary")
            .authorization_bearer(&token)
            .await
            .assert_json(&json!([
                { "ledger": "Bank", "credit": 50.0, "debit": 0.0, "balance": 50.0 }
            ]));

        server
            .delete(&format!("/api/ledger/{}", entry.id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }
}
