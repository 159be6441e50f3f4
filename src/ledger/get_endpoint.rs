//! Defines the endpoint for getting a single entry.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    Error,
    ledger::{core::get_entry, state::LedgerState, state::lock_connection},
    session::SessionId,
};

/// A route handler that responds with the entry `entry_id` as JSON.
///
/// Entries that do not exist and entries owned by another session both get an
/// empty `200 OK` response.
pub async fn get_entry_endpoint(
    State(state): State<LedgerState>,
    Extension(session_id): Extension<SessionId>,
    Path(entry_id): Path<String>,
) -> Response {
    let Ok(entry_id) = Uuid::parse_str(&entry_id) else {
        return Error::Validation(format!("\"{entry_id}\" is not a valid entry ID")).into_response();
    };

    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_response(),
    };

    match get_entry(session_id, entry_id, &connection) {
        Ok(entry) => Json(entry).into_response(),
        Err(Error::NotFound) => {
            tracing::debug!("entry {entry_id} not found in the caller's session");
            StatusCode::OK.into_response()
        }
        Err(error) => {
            tracing::error!("could not get entry {entry_id}: {error}");
            error.into_response()
        }
    }
}
