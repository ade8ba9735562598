//! Route handlers for the daybook API.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserId,
    extract::{Json, Path, Query},
    database_id::DaybookEntryId,
    date_range::DateRangeQuery,
    daybook::{
        Daybook, DaybookEntry, DaybookEntryForm, create_daybook_entry, delete_daybook_entry,
        get_daybook_entries, group_by_day,
    },
};

/// The state needed for the daybook endpoints.
#[derive(Debug, Clone)]
pub struct DaybookState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DaybookState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Respond with the caller's daybook grouped by day. Without `from` and `to`
/// the whole daybook is returned.
pub async fn get_daybook_endpoint(
    State(state): State<DaybookState>,
    user_id: UserId,
    Query(DateRangeQuery { from, to }): Query<DateRangeQuery>,
) -> Result<Json<Daybook>, Error> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(Error::InvalidDateRange {
                from,
                to,
                reason: "the start date is after the end date",
            });
        }
    }

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entries = get_daybook_entries(&user_id, from, to, &connection)?;

    Ok(Json(group_by_day(entries)))
}

pub async fn create_daybook_entry_endpoint(
    State(state): State<DaybookState>,
    user_id: UserId,
    Json(form): Json<DaybookEntryForm>,
) -> Result<(StatusCode, Json<DaybookEntry>), Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let entry = create_daybook_entry(&user_id, form, &connection)?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_daybook_entry_endpoint(
    State(state): State<DaybookState>,
    user_id: UserId,
    Path(entry_id): Path<DaybookEntryId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_daybook_entry(&user_id, entry_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
