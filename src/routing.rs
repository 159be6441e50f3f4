//! Application router configuration with session-scoped and open route definitions.

use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error, endpoints,
    ledger::{
        create_entry_endpoint, get_entry_endpoint, get_summary_endpoint, list_entries_endpoint,
    },
    session::session_guard,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    // Recording an entry is how a session gets created, so it cannot require one.
    let open_routes = Router::new().route(endpoints::TRANSACTIONS, post(create_entry_endpoint));

    let session_routes = Router::new()
        .route(endpoints::TRANSACTIONS, get(list_entries_endpoint))
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .route(endpoints::TRANSACTION, get(get_entry_endpoint))
        .route_layer(middleware::from_fn(session_guard));

    session_routes
        .merge(open_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
