//! History endpoints for the dashboard's income/expense charts.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserId,
    extract::{Json, Query},
    history::{HistoryRow, get_history_periods, get_month_history, get_year_history},
    timezone::local_today,
};

/// The state needed for the history endpoints.
#[derive(Debug, Clone)]
pub struct HistoryState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The granularity of the history to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Monthly totals for a year.
    Year,
    /// Daily totals for a month.
    Month,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub timeframe: Timeframe,
    pub year: i32,
    /// Required for [Timeframe::Month].
    pub month: Option<u8>,
}

/// Respond with the years the caller has history for, or just the current
/// year when there is none yet.
pub async fn get_history_periods_endpoint(
    State(state): State<HistoryState>,
    user_id: UserId,
) -> Result<Json<Vec<i32>>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let years = get_history_periods(&user_id, &connection)?;

    Ok(Json(with_default_year(years, today)))
}

fn with_default_year(years: Vec<i32>, today: Date) -> Vec<i32> {
    if years.is_empty() {
        vec![today.year()]
    } else {
        years
    }
}

/// Respond with zero-filled monthly or daily totals.
pub async fn get_history_endpoint(
    State(state): State<HistoryState>,
    user_id: UserId,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRow>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let rows = match query.timeframe {
        Timeframe::Year => get_year_history(&user_id, query.year, &connection)?,
        Timeframe::Month => get_month_history(
            &user_id,
            query.year,
            query.month.unwrap_or_default(),
            &connection,
        )?,
    };

    Ok(Json(rows))
}
