//! Bizbook is a back office for small businesses: money in and out, customers,
//! stock, staff, invoices, ledgers and a daybook.
//!
//! This library provides a JSON REST API. Callers are identified by bearer
//! tokens from an external identity provider and every record is scoped to
//! the caller.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod customer;
mod database_id;
mod date_range;
mod daybook;
mod db;
pub mod endpoints;
mod error;
mod extract;
mod history;
mod inventory;
mod invoice;
mod ledger;
mod logging;
mod routing;
mod staff;
mod stats;
mod timezone;
mod transaction;
mod transaction_type;
mod user_settings;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::UserId;
pub use category::{CategoryName, create_category};
pub use customer::{CustomerForm, create_customer};
pub use daybook::{DaybookEntryForm, create_daybook_entry};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use inventory::{InventoryItemForm, create_inventory_item};
pub use invoice::{InvoiceForm, PaymentStatus, create_invoice};
pub use ledger::{EntryKind, LedgerEntryForm, create_ledger_entry};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use staff::{StaffForm, create_staff};
pub use transaction::{NewTransaction, create_transaction};
pub use transaction_type::TransactionType;
pub use user_settings::{Currency, update_currency};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
