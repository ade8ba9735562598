//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserId,
    extract::Json,
    timezone::local_today,
    transaction::{NewTransaction, Transaction, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new transaction, responds with the saved transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    user_id: UserId,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let today = local_today(&state.local_timezone)?;

    if new_transaction.date > today {
        tracing::error!(
            "Tried to perform an operation with a future date (e.g., create a transaction)"
        );

        return Err(Error::FutureDate(new_transaction.date));
    }

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(&user_id, new_transaction, &connection)
        .inspect_err(|error| tracing::error!("could not create transaction: {error}"))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use time::{Duration, OffsetDateTime};

    use crate::{
        test_utils::{assert_error_message, create_token, get_test_server},
        transaction::Transaction,
        transaction_type::TransactionType,
    };

    #[tokio::test]
    async fn can_create_transaction() {
        let server = get_test_server();
        let today = OffsetDateTime::now_utc().date();

        let response = server
            .post("/api/transactions")
            .authorization_bearer(create_token("user_1"))
            .json(&json!({
                "amount": 45.5,
                "category": "HDFC Bank",
                "date": today.to_string(),
                "type": "expense",
                "description": "card fees",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<Transaction>();
        assert_eq!(transaction.amount, 45.5);
        assert_eq!(transaction.date, today);
        assert_eq!(transaction.transaction_type, TransactionType::Expense);
        assert_eq!(transaction.category_icon, "💸");
        assert_eq!(transaction.description, "card fees");
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let server = get_test_server();

        let response = server
            .post("/api/transactions")
            .authorization_bearer(create_token("user_1"))
            .json(&json!({
                "amount": 10,
                "category": "Groceries",
                "date": OffsetDateTime::now_utc().date().to_string(),
                "type": "expense",
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert_error_message(&response, "Category not found");
    }

    #[tokio::test]
    async fn future_date_is_rejected() {
        let server = get_test_server();
        let tomorrow = OffsetDateTime::now_utc().date() + Duration::days(1);

        server
            .post("/api/transactions")
            .authorization_bearer(create_token("user_1"))
            .json(&json!({
                "amount": 10,
                "category": "Bank",
                "date": tomorrow.to_string(),
                "type": "income",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn zero_amount_is_rejected() {
        let server = get_test_server();

        server
            .post("/api/transactions")
            .authorization_bearer(create_token("user_1"))
            .json(&json!({
                "amount": 0,
                "category": "Bank",
                "date": OffsetDateTime::now_utc().date().to_string(),
                "type": "income",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_type_is_json_bad_request() {
        let server = get_test_server();

        let response = server
            .post("/api/transactions")
            .authorization_bearer(create_token("user_1"))
            .json(&json!({
                "amount": 10,
                "category": "Bank",
                "date": OffsetDateTime::now_utc().date().to_string(),
                "type": "transfer",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<serde_json::Value>();
        assert!(
            body["error"]
                .as_str()
                .is_some_and(|message| message.contains("unknown variant `transfer`"))
        );
    }

    #[tokio::test]
    async fn malformed_date_is_json_bad_request() {
        let server = get_test_server();

        let response = server
            .post("/api/transactions")
            .authorization_bearer(create_token("user_1"))
            .json(&json!({
                "amount": 10,
                "category": "Bank",
                "date": "14/02/2025",
                "type": "income",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<serde_json::Value>()["error"].is_string());
    }
}
