//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use jsonwebtoken::DecodingKey;
use rusqlite::Connection;

use crate::{Error, db::initialize, timezone::get_local_offset};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key used to verify the tokens issued by the identity provider.
    pub decoding_key: DecodingKey,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `auth_secret` is the secret shared with the identity provider for signing tokens.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the timezone is invalid or the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        auth_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(auth_secret.as_bytes()),
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("local_timezone", &self.local_timezone)
            .finish_non_exhaustive()
    }
}
