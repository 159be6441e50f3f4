//! Session Ledger is a small web service for recording credits and debits
//! against an anonymous session.
//!
//! A session is identified by an opaque token held in the `sessionId` cookie.
//! Every ledger operation is scoped to that token, and the balance of a session
//! is the sum of the sign-normalized amounts of its entries.
//!
//! This library provides a JSON REST API over a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod db;
pub mod endpoints;
mod ledger;
mod logging;
mod routing;
mod session;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use ledger::{
    Direction, Entry, EntryId, NewEntry, Summary, append_entry, get_entry, get_summary,
    list_entries, normalize,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use session::{COOKIE_SESSION_ID, DEFAULT_COOKIE_DURATION, SessionId, resolve};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request was missing a required field or contained a value outside
    /// of the ledger's domain, e.g., an empty title or a negative amount.
    ///
    /// The string describes the problem and is safe to show to the client.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The request did not carry a well-formed session cookie.
    #[error("the request does not have a valid session")]
    SessionMissing,

    /// The requested resource was not found.
    ///
    /// Entries that belong to another session are reported with this error
    /// too, so that callers cannot tell the two cases apart.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The request body was larger than the server is willing to buffer.
    #[error("the request body is too large")]
    PayloadTooLarge,

    /// A response body produced by a handler could not be read.
    #[error("could not read the response body: {0}")]
    ResponseBody(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(message) => error_response(StatusCode::BAD_REQUEST, &message),
            Error::SessionMissing => error_response(StatusCode::UNAUTHORIZED, "Unauthorized."),
            Error::NotFound => error_response(StatusCode::NOT_FOUND, "Not found."),
            Error::PayloadTooLarge => {
                error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large.")
            }
            // Storage errors are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details.",
                )
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
