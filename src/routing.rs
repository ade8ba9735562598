//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde_json::json;

use crate::{
    AppState, Error,
    category::{create_category_endpoint, delete_category_endpoint, get_categories_endpoint},
    customer::{create_customer_endpoint, delete_customer_endpoint, get_customers_endpoint},
    daybook::{
        create_daybook_entry_endpoint, delete_daybook_entry_endpoint, get_daybook_endpoint,
    },
    endpoints,
    history::{get_history_endpoint, get_history_periods_endpoint},
    inventory::{
        create_inventory_item_endpoint, delete_inventory_item_endpoint, get_inventory_endpoint,
        get_inventory_summary_endpoint,
    },
    invoice::{
        create_invoice_endpoint, delete_invoice_endpoint, get_invoice_summary_endpoint,
        get_invoices_endpoint, update_invoice_endpoint,
    },
    ledger::{
        create_ledger_entry_endpoint, delete_ledger_entry_endpoint, get_ledger_entries_endpoint,
        get_ledger_summary_endpoint,
    },
    staff::{
        create_staff_endpoint, delete_staff_endpoint, get_staff_endpoint,
        get_staff_summary_endpoint,
    },
    stats::{get_balance_stats_endpoint, get_category_stats_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
    },
    user_settings::{get_user_settings_endpoint, update_user_settings_endpoint},
};

/// Return a router with all the app's routes.
///
/// Every route other than [endpoints::COFFEE] and [endpoints::HEALTH] takes
/// the caller's identity from a bearer token.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::HEALTH, get(get_health));

    let protected_routes = Router::new()
        .route(
            endpoints::USER_SETTINGS,
            get(get_user_settings_endpoint).patch(update_user_settings_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint)
                .post(create_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(endpoints::HISTORY_PERIODS, get(get_history_periods_endpoint))
        .route(endpoints::HISTORY, get(get_history_endpoint))
        .route(endpoints::BALANCE_STATS, get(get_balance_stats_endpoint))
        .route(endpoints::CATEGORY_STATS, get(get_category_stats_endpoint))
        .route(
            endpoints::CUSTOMERS,
            get(get_customers_endpoint).post(create_customer_endpoint),
        )
        .route(endpoints::CUSTOMER, delete(delete_customer_endpoint))
        .route(
            endpoints::INVENTORY,
            get(get_inventory_endpoint).post(create_inventory_item_endpoint),
        )
        .route(
            endpoints::INVENTORY_SUMMARY,
            get(get_inventory_summary_endpoint),
        )
        .route(
            endpoints::INVENTORY_ITEM,
            delete(delete_inventory_item_endpoint),
        )
        .route(
            endpoints::STAFF,
            get(get_staff_endpoint).post(create_staff_endpoint),
        )
        .route(endpoints::STAFF_SUMMARY, get(get_staff_summary_endpoint))
        .route(endpoints::STAFF_MEMBER, delete(delete_staff_endpoint))
        .route(
            endpoints::INVOICES,
            get(get_invoices_endpoint).post(create_invoice_endpoint),
        )
        .route(endpoints::INVOICE_SUMMARY, get(get_invoice_summary_endpoint))
        .route(
            endpoints::INVOICE,
            delete(delete_invoice_endpoint).patch(update_invoice_endpoint),
        )
        .route(
            endpoints::LEDGER,
            get(get_ledger_entries_endpoint).post(create_ledger_entry_endpoint),
        )
        .route(endpoints::LEDGER_SUMMARY, get(get_ledger_summary_endpoint))
        .route(
            endpoints::LEDGER_ENTRY,
            delete(delete_ledger_entry_endpoint),
        )
        .route(
            endpoints::DAYBOOK,
            get(get_daybook_endpoint).post(create_daybook_entry_endpoint),
        )
        .route(
            endpoints::DAYBOOK_ENTRY,
            delete(delete_daybook_entry_endpoint),
        );

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
