//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, auth::UserId, category::delete_category, extract::Query,
    transaction_type::TransactionType,
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Identifies the category to delete.
#[derive(Debug, Deserialize)]
pub struct DeleteCategoryQuery {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

/// Handle category deletion.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryEndpointState>,
    user_id: UserId,
    Query(query): Query<DeleteCategoryQuery>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_category(&user_id, &query.name, query.category_type, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
