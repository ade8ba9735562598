//! Route handlers for the inventory API.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserId,
    extract::{Json, Path},
    database_id::InventoryItemId,
    inventory::{
        InventoryItem, InventoryItemForm, InventorySummary, create_inventory_item,
        delete_inventory_item, get_inventory, summarize_inventory,
    },
};

/// The state needed for the inventory endpoints.
#[derive(Debug, Clone)]
pub struct InventoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for InventoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn get_inventory_endpoint(
    State(state): State<InventoryState>,
    user_id: UserId,
) -> Result<Json<Vec<InventoryItem>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_inventory(&user_id, &connection).map(Json)
}

pub async fn get_inventory_summary_endpoint(
    State(state): State<InventoryState>,
    user_id: UserId,
) -> Result<Json<InventorySummary>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let items = get_inventory(&user_id, &connection)?;

    Ok(Json(summarize_inventory(items)))
}

pub async fn create_inventory_item_endpoint(
    State(state): State<InventoryState>,
    user_id: UserId,
    Json(form): Json<InventoryItemForm>,
) -> Result<(StatusCode, Json<InventoryItem>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let item = create_inventory_item(&user_id, form, &connection)?;

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn delete_inventory_item_endpoint(
    State(state): State<InventoryState>,
    user_id: UserId,
    Path(item_id): Path<InventoryItemId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_inventory_item(&user_id, item_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        inventory::{InventoryItem, InventorySummary},
        test_utils::{create_token, get_test_server},
    };

    #[tokio::test]
    async fn summary_reflects_created_items() {
        let server = get_test_server();
        let token = create_token("user_1");
        for body in [
            json!({ "name": "Widget", "sku": "W-1", "quantity": 4, "unit_price": 2.5, "reorder_level": 5 }),
            json!({ "name": "Bolt", "sku": "B-1", "quantity": 50, "unit_price": 0.2 }),
        ] {
            server
                .post("/api/inventory")
                .authorization_bearer(&token)
                .json(&body)
                .await
                .assert_status(StatusCode::CREATED);
        }

        let summary = server
            .get("/api/inventory/summary")
            .authorization_bearer(&token)
            .await
            .json::<InventorySummary>();

        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.total_units, 54);
        assert_eq!(summary.low_stock.len(), 1);
        assert_eq!(summary.low_stock[0].sku, "W-1");
    }

    #[tokio::test]
    async fn delete_item() {
        let server = get_test_server();
        let token = create_token("user_1");
        let item = server
            .post("/api/inventory")
            .authorization_bearer(&token)
            .json(&json!({ "name": "Widget", "sku": "W-1", "quantity": 1, "unit_price": 1 }))
            .await
            .json::<InventoryItem>();

        server
            .delete(&format!("/api/inventory/{}", item.id))
            .authorization_bearer(create_token("user_2"))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&format!("/api/inventory/{}", item.id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn negative_quantity_is_rejected() {
        let server = get_test_server();

        let response = server
            .post("/api/inventory")
            .authorization_bearer(create_token("user_1"))
            .json(&json!({ "name": "Widget", "sku": "W-1", "quantity": -1, "unit_price": 1 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<serde_json::Value>();
        assert!(body["error"].as_str().is_some_and(|message| message.contains("quantity")));
    }
}
