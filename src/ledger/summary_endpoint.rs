//! Defines the endpoint for getting a session's balance.

use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    ledger::{core::get_summary, state::LedgerState, state::lock_connection},
    session::SessionId,
};

/// A route handler that responds with the balance of the caller's session,
/// e.g. `{"amount": 5000}`.
pub async fn get_summary_endpoint(
    State(state): State<LedgerState>,
    Extension(session_id): Extension<SessionId>,
) -> Response {
    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_response(),
    };

    match get_summary(session_id, &connection) {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => {
            tracing::error!("could not get summary: {error}");
            error.into_response()
        }
    }
}
