//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::Request,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{Error, session::COOKIE_SESSION_ID};

/// The number of bytes of a request or response body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request or response body, in bytes, that the logging middleware
/// will buffer.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Session tokens in the `Cookie` and `Set-Cookie` headers are redacted.
///
/// Requests with a body over [MAX_BODY_BYTES] are rejected with
/// `413 Payload Too Large`. Responses that may be larger than that are passed
/// through untouched and only their headers are logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_request_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => return error.into_response(),
    };

    log_message(
        &format!("Received request: {} {}", parts.method, parts.uri),
        &redact_session_headers(&parts.headers),
        &body_bytes,
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let summary = format!("Sending response: {}", parts.status);
    let headers = redact_session_headers(&parts.headers);

    if !fits_in_buffer(&body) {
        tracing::info!("{summary}\nheaders: {headers:#?}\nbody: <not logged>");
        return Response::from_parts(parts, body);
    }

    let body_bytes = match read_response_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => return error.into_response(),
    };

    log_message(&summary, &headers, &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

fn fits_in_buffer(body: &Body) -> bool {
    body.size_hint()
        .upper()
        .is_some_and(|upper| upper <= MAX_BODY_BYTES as u64)
}

async fn read_request_body(body: Body) -> Result<Bytes, Error> {
    axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|error| {
            tracing::debug!("could not read request body: {error}");
            Error::PayloadTooLarge
        })
}

async fn read_response_body(body: Body) -> Result<Bytes, Error> {
    axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|error| Error::ResponseBody(error.to_string()))
}

fn log_message(summary: &str, headers: &HeaderMap, body: &[u8]) {
    let body = String::from_utf8_lossy(body);

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        let end = floor_char_boundary(&body, LOG_BODY_LENGTH_LIMIT);
        tracing::info!("{summary}\nheaders: {headers:#?}\nbody: {}...", &body[..end]);
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{summary}\nheaders: {headers:#?}\nbody: {body:?}");
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    (0..=index)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0)
}

/// Copy `headers`, replacing the value of the session cookie with asterisks.
fn redact_session_headers(headers: &HeaderMap) -> HeaderMap {
    let mut redacted = headers.clone();

    for name in [COOKIE, SET_COOKIE] {
        let values: Vec<HeaderValue> = headers
            .get_all(&name)
            .iter()
            .map(|value| match value.to_str() {
                Ok(text) => HeaderValue::from_str(&redact_session_id(text))
                    .unwrap_or_else(|_| HeaderValue::from_static("********")),
                Err(_) => HeaderValue::from_static("********"),
            })
            .collect();

        redacted.remove(&name);
        for value in values {
            redacted.append(name.clone(), value);
        }
    }

    redacted
}

fn redact_session_id(cookie_text: &str) -> String {
    let prefix = format!("{COOKIE_SESSION_ID}=");
    let Some(start) = cookie_text.find(&prefix) else {
        return cookie_text.to_string();
    };

    let value_start = start + prefix.len();
    let value_end = cookie_text[value_start..]
        .find(';')
        .map(|end| value_start + end)
        .unwrap_or(cookie_text.len());

    format!(
        "{}********{}",
        &cookie_text[..value_start],
        &cookie_text[value_end..]
    )
}
