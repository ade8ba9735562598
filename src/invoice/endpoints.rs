//! Route handlers for the invoice API.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    auth::UserId,
    extract::{Json, Path},
    database_id::InvoiceId,
    invoice::{
        Invoice, InvoiceForm, InvoiceStatus, InvoiceSummary, PaymentStatus, create_invoice,
        delete_invoice, get_invoices, set_payment_status, summarize_invoices,
    },
    timezone::local_today,
};

/// The state needed for the invoice endpoints.
#[derive(Debug, Clone)]
pub struct InvoiceState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for InvoiceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// An invoice together with its status as of today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub status: InvoiceStatus,
}

impl InvoiceView {
    fn new(invoice: Invoice, today: Date) -> Self {
        Self {
            status: invoice.status(today),
            invoice,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusForm {
    pub payment_status: PaymentStatus,
}

pub async fn get_invoices_endpoint(
    State(state): State<InvoiceState>,
    user_id: UserId,
) -> Result<Json<Vec<InvoiceView>>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let invoices = get_invoices(&user_id, &connection)?
        .into_iter()
        .map(|invoice| InvoiceView::new(invoice, today))
        .collect();

    Ok(Json(invoices))
}

pub async fn get_invoice_summary_endpoint(
    State(state): State<InvoiceState>,
    user_id: UserId,
) -> Result<Json<InvoiceSummary>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let invoices = get_invoices(&user_id, &connection)?;

    Ok(Json(summarize_invoices(&invoices, today)))
}

pub async fn create_invoice_endpoint(
    State(state): State<InvoiceState>,
    user_id: UserId,
    Json(form): Json<InvoiceForm>,
) -> Result<(StatusCode, Json<InvoiceView>), Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let invoice = create_invoice(&user_id, form, &connection)?;

    Ok((StatusCode::CREATED, Json(InvoiceView::new(invoice, today))))
}

/// Mark an invoice as paid or unpaid.
pub async fn update_invoice_endpoint(
    State(state): State<InvoiceState>,
    user_id: UserId,
    Path(invoice_id): Path<InvoiceId>,
    Json(form): Json<PaymentStatusForm>,
) -> Result<Json<InvoiceView>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let invoice = set_payment_status(&user_id, invoice_id, form.payment_status, &connection)?;

    Ok(Json(InvoiceView::new(invoice, today)))
}

pub async fn delete_invoice_endpoint(
    State(state): State<InvoiceState>,
    user_id: UserId,
    Path(invoice_id): Path<InvoiceId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_invoice(&user_id, invoice_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
