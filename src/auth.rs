//! Identity of the caller, taken from the bearer token issued by the external
//! identity provider.
//!
//! The provider signs HS256 JSON Web Tokens with a secret shared with this
//! server. The token's subject is the provider's user ID, which is the key that
//! every record in the database is scoped by.

use std::fmt::Display;

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::AppState;

/// The ID the identity provider uses for a user, e.g. "user_2NNEqL2nrIRdJ194ndJqAHwEfxC".
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Create a user ID.
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// The user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The contents of a JSON Web Token issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The subject, i.e. the user ID.
    pub sub: String,
    /// The expiry time of the token as a unix timestamp.
    pub exp: u64,
}

/// The state needed to verify tokens.
#[derive(Clone)]
pub struct AuthState {
    /// The key to verify token signatures with.
    pub decoding_key: DecodingKey,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            decoding_key: state.decoding_key.clone(),
        }
    }
}

/// Why a request could not be authenticated.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum AuthError {
    /// The request has no bearer token.
    #[error("Missing credentials")]
    MissingCredentials,
    /// The token is malformed, expired, has a bad signature, or has no subject.
    #[error("Invalid token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

impl<S> FromRequestParts<S> for UserId
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingCredentials)?;

        let auth_state = AuthState::from_ref(state);
        let claims = decode_token(bearer.token(), &auth_state.decoding_key)?;

        Ok(UserId(claims.sub))
    }
}

fn decode_token(token: &str, decoding_key: &DecodingKey) -> Result<Claims, AuthError> {
    let claims = decode::<Claims>(token, decoding_key, &Validation::new(Algorithm::HS256))
        .map_err(|error| {
            tracing::debug!("Rejected token: {error}");
            AuthError::InvalidToken
        })?
        .claims;

    if claims.sub.trim().is_empty() {
        tracing::debug!("Rejected token with an empty subject");
        return Err(AuthError::InvalidToken);
    }

    Ok(claims)
}
