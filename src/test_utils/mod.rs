//! Helpers shared by the unit tests.

use axum_test::{TestResponse, TestServer};
use jsonwebtoken::{EncodingKey, Header, encode};
use rusqlite::Connection;
use serde_json::json;
use time::{Duration, OffsetDateTime};

use crate::{AppState, auth::Claims, build_router};

/// The secret the test tokens are signed with.
pub(crate) const TEST_SECRET: &str = "test-secret";

fn sign(sub: &str, expires_at: OffsetDateTime) -> String {
    let claims = Claims {
        sub: sub.to_owned(),
        exp: expires_at.unix_timestamp() as u64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Could not sign test token.")
}

/// A token for `sub` that is valid for the next hour.
pub(crate) fn create_token(sub: &str) -> String {
    sign(sub, OffsetDateTime::now_utc() + Duration::hours(1))
}

/// A token for `sub` that expired an hour ago.
pub(crate) fn create_expired_token(sub: &str) -> String {
    sign(sub, OffsetDateTime::now_utc() - Duration::hours(1))
}

/// A server with every route, backed by a fresh in-memory database.
pub(crate) fn get_test_server() -> TestServer {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let state = AppState::new(connection, TEST_SECRET, "Etc/UTC")
        .expect("Could not create app state.");

    TestServer::new(build_router(state)).expect("Could not create test server.")
}

#[track_caller]
pub(crate) fn assert_error_message(response: &TestResponse, message: &str) {
    response.assert_json(&json!({ "error": message }));
}
