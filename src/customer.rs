//! Customers of the business and their contact details.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserId,
    database_id::CustomerId,
    error::is_unique_violation,
    extract::{Json, Path},
};

/// A customer of the business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// Unique among the user's customers when set.
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
}

/// The request body for creating a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerForm {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Save a new customer for `user_id`.
///
/// Surrounding whitespace is trimmed from every field and a blank email is
/// stored as no email.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] if the name is blank,
/// - [Error::DuplicateCustomerEmail] if another customer already has the email,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_customer(
    user_id: &UserId,
    form: CustomerForm,
    connection: &Connection,
) -> Result<Customer, Error> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyField("name"));
    }

    let email = form
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty());

    connection
        .prepare(
            "INSERT INTO customer (user_id, name, email, phone, address)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, name, email, phone, address",
        )?
        .query_row(
            (
                user_id.as_str(),
                name,
                email,
                form.phone.trim(),
                form.address.trim(),
            ),
            map_customer_row,
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateCustomerEmail(email.unwrap_or_default().to_owned())
            } else {
                error.into()
            }
        })
}

/// Retrieve the customers of `user_id` ordered by name.
pub fn get_customers(user_id: &UserId, connection: &Connection) -> Result<Vec<Customer>, Error> {
    connection
        .prepare(
            "SELECT id, name, email, phone, address FROM customer
             WHERE user_id = ?1 ORDER BY name COLLATE NOCASE ASC, id ASC",
        )?
        .query_map([user_id.as_str()], map_customer_row)?
        .map(|maybe_customer| maybe_customer.map_err(Error::from))
        .collect()
}

/// Delete the customer `id` of `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingCustomer] if the user has no such customer.
pub fn delete_customer(
    user_id: &UserId,
    id: CustomerId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM customer WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCustomer);
    }

    Ok(())
}

pub fn create_customer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS customer (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            UNIQUE (user_id, email)
        )",
        (),
    )?;

    Ok(())
}

fn map_customer_row(row: &Row) -> Result<Customer, rusqlite::Error> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
    })
}

/// The state needed for the customer endpoints.
#[derive(Debug, Clone)]
pub struct CustomerState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CustomerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn get_customers_endpoint(
    State(state): State<CustomerState>,
    user_id: UserId,
) -> Result<Json<Vec<Customer>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_customers(&user_id, &connection).map(Json)
}

pub async fn create_customer_endpoint(
    State(state): State<CustomerState>,
    user_id: UserId,
    Json(form): Json<CustomerForm>,
) -> Result<(StatusCode, Json<Customer>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let customer = create_customer(&user_id, form, &connection)?;

    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn delete_customer_endpoint(
    State(state): State<CustomerState>,
    user_id: UserId,
    Path(customer_id): Path<CustomerId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_customer(&user_id, customer_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
