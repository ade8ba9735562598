//! Staff members and the monthly payroll they add up to.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    auth::UserId,
    database_id::StaffId,
    extract::{Json, Path},
};

/// A person employed by the business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    /// Monthly salary.
    pub salary: f64,
    pub joined_on: Date,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffForm {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub salary: f64,
    pub joined_on: Date,
}

/// Head count and payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffSummary {
    pub head_count: usize,
    pub total_salary: f64,
}

/// Add a staff member for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] if the name is blank,
/// - [Error::InvalidAmount] if the salary is negative or not finite,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_staff(
    user_id: &UserId,
    form: StaffForm,
    connection: &Connection,
) -> Result<Staff, Error> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyField("name"));
    }

    if !form.salary.is_finite() || form.salary < 0.0 {
        return Err(Error::InvalidAmount(form.salary));
    }

    connection
        .prepare(
            "INSERT INTO staff (user_id, name, role, email, phone, salary, joined_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, name, role, email, phone, salary, joined_on",
        )?
        .query_row(
            (
                user_id.as_str(),
                name,
                form.role.trim(),
                form.email.trim(),
                form.phone.trim(),
                form.salary,
                form.joined_on,
            ),
            map_staff_row,
        )
        .map_err(Error::from)
}

/// Retrieve the staff of `user_id` ordered by name.
pub fn get_staff(user_id: &UserId, connection: &Connection) -> Result<Vec<Staff>, Error> {
    connection
        .prepare(
            "SELECT id, name, role, email, phone, salary, joined_on FROM staff
             WHERE user_id = ?1 ORDER BY name COLLATE NOCASE ASC, id ASC",
        )?
        .query_map([user_id.as_str()], map_staff_row)?
        .map(|maybe_staff| maybe_staff.map_err(Error::from))
        .collect()
}

pub fn summarize_staff(staff: &[Staff]) -> StaffSummary {
    StaffSummary {
        head_count: staff.len(),
        total_salary: staff.iter().map(|member| member.salary).sum(),
    }
}

/// Delete the staff member `id` of `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingStaff] if the user has no such staff member.
pub fn delete_staff(user_id: &UserId, id: StaffId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM staff WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingStaff);
    }

    Ok(())
}

pub fn create_staff_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS staff (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            salary REAL NOT NULL CHECK (salary >= 0),
            joined_on TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_staff_row(row: &Row) -> Result<Staff, rusqlite::Error> {
    Ok(Staff {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        salary: row.get(5)?,
        joined_on: row.get(6)?,
    })
}

/// The state needed for the staff endpoints.
#[derive(Debug, Clone)]
pub struct StaffState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for StaffState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn get_staff_endpoint(
    State(state): State<StaffState>,
    user_id: UserId,
) -> Result<Json<Vec<Staff>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_staff(&user_id, &connection).map(Json)
}

pub async fn get_staff_summary_endpoint(
    State(state): State<StaffState>,
    user_id: UserId,
) -> Result<Json<StaffSummary>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let staff = get_staff(&user_id, &connection)?;

    Ok(Json(summarize_staff(&staff)))
}

pub async fn create_staff_endpoint(
    State(state): State<StaffState>,
    user_id: UserId,
    Json(form): Json<StaffForm>,
) -> Result<(StatusCode, Json<Staff>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let staff = create_staff(&user_id, form, &connection)?;

    Ok((StatusCode::CREATED, Json(staff)))
}

pub async fn delete_staff_endpoint(
    State(state): State<StaffState>,
    user_id: UserId,
    Path(staff_id): Path<StaffId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_staff(&user_id, staff_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
