//! Income and expense totals over a date range for the dashboard cards and
//! the category breakdown chart.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserId,
    extract::{Json, Query},
    date_range::{DateRange, DateRangeQuery},
    timezone::local_today,
    transaction_type::TransactionType,
};

/// Total income and expense over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceStats {
    pub income: f64,
    pub expense: f64,
}

/// The total amount of one category over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    pub category: String,
    pub category_icon: String,
    pub amount: f64,
}

/// Sum the caller's income and expenses dated within `range`.
pub fn get_balance_stats(
    user_id: &UserId,
    range: DateRange,
    connection: &Connection,
) -> Result<BalanceStats, Error> {
    connection
        .prepare(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount END), 0)
             FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3",
        )?
        .query_row((user_id.as_str(), range.from, range.to), |row| {
            Ok(BalanceStats {
                income: row.get(0)?,
                expense: row.get(1)?,
            })
        })
        .map_err(Error::from)
}

/// Sum the caller's transactions dated within `range` per category, largest
/// total first.
///
/// Categories are identified by the name and icon stored on each transaction,
/// so deleted categories still show up.
pub fn get_category_stats(
    user_id: &UserId,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<CategoryStats>, Error> {
    connection
        .prepare(
            "SELECT type, category, category_icon, SUM(amount) AS total
             FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             GROUP BY type, category, category_icon
             ORDER BY total DESC, category ASC",
        )?
        .query_map((user_id.as_str(), range.from, range.to), |row| {
            Ok(CategoryStats {
                category_type: row.get(0)?,
                category: row.get(1)?,
                category_icon: row.get(2)?,
                amount: row.get(3)?,
            })
        })?
        .map(|maybe_stats| maybe_stats.map_err(Error::from))
        .collect()
}

/// The state needed for the statistics endpoints.
#[derive(Debug, Clone)]
pub struct StatsState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for StatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

pub async fn get_balance_stats_endpoint(
    State(state): State<StatsState>,
    user_id: UserId,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<BalanceStats>, Error> {
    let range = query.resolve(local_today(&state.local_timezone)?)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_balance_stats(&user_id, range, &connection).map(Json)
}

pub async fn get_category_stats_endpoint(
    State(state): State<StatsState>,
    user_id: UserId,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<CategoryStats>>, Error> {
    let range = query.resolve(local_today(&state.local_timezone)?)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_category_stats(&user_id, range, &connection).map(Json)
}


#[cfg(test)]
mod endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_utils::{create_token, get_test_server};

    #[tokio::test]
    async fn balance_defaults_to_empty_month() {
        let server = get_test_server();

        server
            .get("/api/stats/balance")
            .authorization_bearer(create_token("user_1"))
            .await
            .assert_json(&json!({ "income": 0.0, "expense": 0.0 }));
    }

    #[tokio::test]
    async fn categories_reject_overlong_range() {
        let server = get_test_server();

        server
            .get("/api/stats/categories")
            .add_query_param("from", "2020-01-01")
            .add_query_param("to", "2021-06-01")
            .authorization_bearer(create_token("user_1"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
