//! Per-user preferences, currently just the currency amounts are shown in.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use numfmt::{Formatter, Precision};
use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, auth::UserId, extract::Json};

/// The currencies a user can choose to display amounts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// US dollar.
    USD,
    /// Euro.
    EUR,
    /// Pound sterling.
    GBP,
    /// Japanese yen.
    JPY,
    /// Indian rupee.
    INR,
}

impl Currency {
    /// The currency used until the user picks another one.
    pub const DEFAULT: Currency = Currency::USD;

    /// The three letter ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::INR => "INR",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::INR => "₹",
        }
    }

    fn decimals(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "INR" => Ok(Currency::INR),
            other => Err(Error::InvalidCurrency(other.to_owned())),
        }
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.code().into())
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Format `amount` with the symbol, thousands separators and decimal places of `currency`.
///
/// For example, 1234.5 in [Currency::USD] is "$1,234.50" and 1500 in [Currency::JPY] is "¥1,500".
pub fn format_amount(amount: f64, currency: Currency) -> String {
    let decimals = currency.decimals();
    let symbol = currency.symbol();

    // numfmt truncates extra decimals and uses scientific notation below the
    // smallest unit, e.g. "$4.0e-3", so round to whole units first.
    let scale = 10_f64.powi(i32::from(decimals));
    let rounded = (amount.abs() * scale).round() / scale;

    if rounded == 0.0 {
        return pad_decimals(format!("{symbol}0"), decimals);
    }

    let prefix = if amount < 0.0 {
        format!("-{symbol}")
    } else {
        symbol.to_owned()
    };

    let formatter = match Formatter::currency(&prefix) {
        Ok(formatter) => formatter.precision(Precision::Decimals(decimals)),
        Err(error) => {
            tracing::error!("Could not create currency formatter for {currency}: {error:?}");
            return format!("{prefix}{:.*}", decimals as usize, rounded);
        }
    };

    pad_decimals(formatter.fmt_string(rounded), decimals)
}

// numfmt drops trailing zeros, e.g. "12.30" is rendered as "12.3".
fn pad_decimals(mut formatted: String, decimals: u8) -> String {
    if decimals == 0 {
        return formatted;
    }

    let present = match formatted.find('.') {
        Some(position) => formatted.len() - position - 1,
        None => {
            formatted.push('.');
            0
        }
    };

    for _ in present..decimals as usize {
        formatted.push('0');
    }

    formatted
}

/// The preferences of a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// The user the settings belong to.
    pub user_id: UserId,
    /// The currency to display amounts in.
    pub currency: Currency,
}

pub fn create_user_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_settings (
            user_id TEXT PRIMARY KEY,
            currency TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_user_settings(row: &Row) -> Result<UserSettings, rusqlite::Error> {
    let user_id: String = row.get(0)?;
    let currency = row.get(1)?;

    Ok(UserSettings {
        user_id: UserId::new(&user_id),
        currency,
    })
}

/// Get the settings for `user_id`, saving the defaults first if the user has none yet.
pub fn get_or_create_user_settings(
    user_id: &UserId,
    connection: &Connection,
) -> Result<UserSettings, Error> {
    connection.execute(
        "INSERT OR IGNORE INTO user_settings (user_id, currency) VALUES (?1, ?2)",
        (user_id.as_str(), Currency::DEFAULT),
    )?;

    connection
        .prepare("SELECT user_id, currency FROM user_settings WHERE user_id = ?1")?
        .query_row([user_id.as_str()], map_row_to_user_settings)
        .map_err(Error::from)
}

/// Get the currency for `user_id`, falling back to the default when none has been saved.
pub fn get_currency(user_id: &UserId, connection: &Connection) -> Result<Currency, Error> {
    match connection
        .prepare("SELECT currency FROM user_settings WHERE user_id = ?1")?
        .query_row([user_id.as_str()], |row| row.get(0))
    {
        Ok(currency) => Ok(currency),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Currency::DEFAULT),
        Err(error) => Err(error.into()),
    }
}

/// Save `currency` as the display currency for `user_id`.
pub fn update_currency(
    user_id: &UserId,
    currency: Currency,
    connection: &Connection,
) -> Result<UserSettings, Error> {
    connection
        .prepare(
            "INSERT INTO user_settings (user_id, currency) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET currency = excluded.currency
             RETURNING user_id, currency",
        )?
        .query_row((user_id.as_str(), currency), map_row_to_user_settings)
        .map_err(Error::from)
}

/// The state needed to read and update user settings.
#[derive(Debug, Clone)]
pub struct UserSettingsState {
    /// The database connection for managing user settings.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserSettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for changing settings.
#[derive(Debug, Deserialize)]
pub struct UserSettingsForm {
    /// The ISO 4217 currency code, e.g. "EUR".
    pub currency: String,
}

/// A route handler that responds with the caller's settings.
pub async fn get_user_settings_endpoint(
    State(state): State<UserSettingsState>,
    user_id: UserId,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_or_create_user_settings(&user_id, &connection) {
        Ok(settings) => Json(settings).into_response(),
        Err(error) => {
            tracing::error!("could not get settings for user {user_id}: {error}");
            error.into_response()
        }
    }
}

/// A route handler for changing the caller's display currency.
pub async fn update_user_settings_endpoint(
    State(state): State<UserSettingsState>,
    user_id: UserId,
    Json(form): Json<UserSettingsForm>,
) -> Result<Json<UserSettings>, Error> {
    let currency: Currency = form.currency.parse()?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_currency(&user_id, currency, &connection).map(Json)
}
