//! Category creation endpoint.

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
    extract::Json,
    category::{Category, CategoryName, create_category},
    transaction_type::TransactionType,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    /// Defaults to the icon for `category_type` when missing or blank.
    #[serde(default)]
    pub icon: Option<String>,
}

/// Handle category creation, responding with the new category.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    user_id: UserId,
    Json(form): Json<CategoryForm>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let name = CategoryName::new(&form.name)?;
    let icon = match form.icon.as_deref().map(str::trim) {
        Some(icon) if !icon.is_empty() => icon.to_owned(),
        _ => form.category_type.default_icon().to_owned(),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = create_category(&user_id, name, &icon, form.category_type, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[cfg(test)]
mod create_category_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        category::Category,
        test_utils::{create_token, get_test_server},
        transaction_type::TransactionType,
    };

    #[tokio::test]
    async fn creates_category() {
        let server = get_test_server();

        let response = server
            .post("/api/categories")
            .authorization_bearer(create_token("user_1"))
            .json(&json!({ "name": "Sales", "type": "income", "icon": "🛒" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let category = response.json::<Category>();
        assert_eq!(category.name.as_ref(), "Sales");
        assert_eq!(category.icon, "🛒");
        assert_eq!(category.category_type, TransactionType::Income);
    }

    #[tokio::test]
    async fn missing_icon_uses_type_default() {
        let server = get_test_server();

        let category = server
            .post("/api/categories")
            .authorization_bearer(create_token("user_1"))
            .json(&json!({ "name": "Rent", "type": "expense" }))
            .await
            .json::<Category>();

        assert_eq!(category.icon, "💸");
    }

    #[tokio::test]
    async fn duplicate_category_is_a_conflict() {
        let server = get_test_server();
        let token = create_token("user_1");
        let body = json!({ "name": "Rent", "type": "expense" });

        server
            .post("/api/categories")
            .authorization_bearer(&token)
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/api/categories")
            .authorization_bearer(&token)
            .json(&body)
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let server = get_test_server();

        server
            .post("/api/categories")
            .authorization_bearer(create_token("user_1"))
            .json(&json!({ "name": "  ", "type": "expense" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn requires_token() {
        let server = get_test_server();

        server
            .post("/api/categories")
            .json(&json!({ "name": "Rent", "type": "expense" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
