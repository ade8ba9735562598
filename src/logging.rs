//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::Error;

/// Bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body the middleware will buffer.
///
/// Matches the default body limit of axum's extractors.
pub const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level with the
/// bearer token hidden. If a body is longer than [LOG_BODY_LENGTH_LIMIT]
/// bytes, it is truncated and the full body is logged at the `debug` level.
///
/// The bodies are passed on byte for byte, only the logged copy is decoded.
/// Request bodies longer than [MAX_REQUEST_BODY_BYTES] are rejected with
/// `413 Payload Too Large`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, MAX_REQUEST_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("could not read request body: {error}");
            return Error::RequestBodyTooLarge(MAX_REQUEST_BODY_BYTES).into_response();
        }
    };

    log_request(
        &parts.method,
        &parts.uri,
        &redact_authorization(&parts.headers),
        &bytes_to_text(&body_bytes),
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(parts.status, &parts.headers, &bytes_to_text(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

fn redact_authorization(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if headers.contains_key(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer ********"));
    }

    headers
}

fn bytes_to_text(bytes: &Bytes) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn truncate(body: &str) -> &str {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return body;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(
    method: &axum::http::Method,
    uri: &axum::http::Uri,
    headers: &HeaderMap,
    body: &str,
) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {method} {uri} {headers:#?}\nbody: {:}...",
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {method} {uri} {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(status: StatusCode, headers: &HeaderMap, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {status} {headers:#?}\nbody: {:}...",
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {status} {headers:#?}\nbody: {body:?}");
    }
}
