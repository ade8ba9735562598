//! Category listing endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserId,
    extract::{Json, Query},
    category::{Category, get_categories},
    transaction_type::TransactionType,
};

/// The state needed for listing categories.
#[derive(Debug, Clone)]
pub struct CategoriesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Optional filter for the category listing.
#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    #[serde(rename = "type")]
    pub category_type: Option<TransactionType>,
}

/// Respond with the caller's categories sorted by name.
pub async fn get_categories_endpoint(
    State(state): State<CategoriesState>,
    user_id: UserId,
    Query(query): Query<CategoriesQuery>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_categories(&user_id, query.category_type, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))
        .map(Json)
}

#[cfg(test)]
mod get_categories_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        category::Category,
        test_utils::{create_token, get_test_server},
    };

    #[tokio::test]
    async fn lists_only_callers_categories_of_type() {
        let server = get_test_server();
        let token = create_token("user_1");
        for (name, category_type) in [("Wages", "expense"), ("Sales", "income"), ("Rent", "expense")]
        {
            server
                .post("/api/categories")
                .authorization_bearer(&token)
                .json(&json!({ "name": name, "type": category_type }))
                .await
                .assert_status(StatusCode::CREATED);
        }
        server
            .post("/api/categories")
            .authorization_bearer(create_token("user_2"))
            .json(&json!({ "name": "Fuel", "type": "expense" }))
            .await
            .assert_status(StatusCode::CREATED);

        let categories = server
            .get("/api/categories")
            .add_query_param("type", "expense")
            .authorization_bearer(&token)
            .await
            .json::<Vec<Category>>();

        let names: Vec<&str> = categories.iter().map(|c| c.name.as_ref()).collect();
        assert_eq!(names, ["Rent", "Wages"]);
    }

    #[tokio::test]
    async fn invalid_type_filter_is_rejected() {
        let server = get_test_server();

        let response = server
            .get("/api/categories")
            .add_query_param("type", "other")
            .authorization_bearer(create_token("user_1"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<serde_json::Value>()["error"].is_string());
    }
}
