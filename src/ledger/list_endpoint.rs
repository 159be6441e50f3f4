//! Defines the endpoint for listing a session's entries.

use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    ledger::{core::list_entries, state::LedgerState, state::lock_connection},
    session::SessionId,
};

/// A route handler that responds with every entry of the caller's session as a JSON array.
pub async fn list_entries_endpoint(
    State(state): State<LedgerState>,
    Extension(session_id): Extension<SessionId>,
) -> Response {
    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_response(),
    };

    match list_entries(session_id, &connection) {
        Ok(entries) => Json(entries).into_response(),
        Err(error) => {
            tracing::error!("could not list entries: {error}");
            error.into_response()
        }
    }
}
