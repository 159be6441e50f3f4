//! Defines the endpoint for recording a new ledger entry.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    ledger::{Direction, NewEntry, core::append_entry, state::lock_connection},
    session::{COOKIE_SESSION_ID, resolve, set_session_cookie},
};

/// The state needed to record an entry and issue a session.
#[derive(Debug, Clone)]
pub struct CreateEntryState {
    /// The database connection for managing entries.
    pub db_connection: Arc<Mutex<Connection>>,
    /// How long a newly issued session cookie stays valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for CreateEntryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

/// The request body for recording an entry.
#[derive(Debug, Deserialize)]
pub struct EntryForm {
    /// Text describing the entry.
    pub title: String,
    /// The unsigned value of the entry in minor currency units.
    pub amount: i64,
    /// Whether the entry is a credit or a debit.
    #[serde(rename = "type")]
    pub direction: Direction,
}

/// A route handler for recording a new entry, responds with `201 Created` on success.
///
/// A session is issued through the `sessionId` cookie if the request does not
/// already carry a well-formed one.
pub async fn create_entry_endpoint(
    State(state): State<CreateEntryState>,
    jar: CookieJar,
    payload: Result<Json<EntryForm>, JsonRejection>,
) -> Response {
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => {
            tracing::debug!("rejected entry body: {}", rejection.body_text());
            return Error::Validation(rejection.body_text()).into_response();
        }
    };

    let new_entry = match NewEntry::new(&form.title, form.amount, form.direction) {
        Ok(new_entry) => new_entry,
        Err(error) => return error.into_response(),
    };

    let (session_id, is_new) = resolve(jar.get(COOKIE_SESSION_ID).map(Cookie::value_trimmed));
    let jar = if is_new {
        tracing::info!("issuing a new session");
        set_session_cookie(jar, session_id, state.cookie_duration)
    } else {
        jar
    };

    let connection = match lock_connection(&state.db_connection) {
        Ok(connection) => connection,
        Err(error) => return error.into_response(),
    };

    if let Err(error) = append_entry(session_id, new_entry, &connection) {
        tracing::error!("could not record entry: {error}");
        return error.into_response();
    }

    (StatusCode::CREATED, jar).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{
        db::initialize,
        ledger::{create_endpoint::CreateEntryState, create_entry_endpoint, list_entries},
        session::{COOKIE_SESSION_ID, DEFAULT_COOKIE_DURATION, SessionId},
    };

    fn get_test_state() -> CreateEntryState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        CreateEntryState {
            db_connection: Arc::new(Mutex::new(conn)),
            cookie_duration: DEFAULT_COOKIE_DURATION,
        }
    }

    fn get_test_server(state: CreateEntryState) -> TestServer {
        let app = Router::new()
            .route("/transactions", post(create_entry_endpoint))
            .with_state(state);

        TestServer::new(app)
    }

    #[tokio::test]
    async fn can_create_entry() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post("/transactions")
            .json(&json!({ "title": "New transaction", "amount": 1000, "type": "debit" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.assert_text("");

        let session_id = SessionId::parse(response.cookie(COOKIE_SESSION_ID).value()).unwrap();
        let connection = state.db_connection.lock().unwrap();
        let entries = list_entries(session_id, &connection).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "New transaction");
        assert_eq!(entries[0].amount, -1000);
    }

    #[tokio::test]
    async fn new_session_cookie_lasts_seven_days() {
        let server = get_test_server(get_test_state());

        let response = server
            .post("/transactions")
            .json(&json!({ "title": "Salary", "amount": 8000, "type": "credit" }))
            .await;

        let cookie = response.cookie(COOKIE_SESSION_ID);
        assert_eq!(cookie.max_age(), Some(DEFAULT_COOKIE_DURATION));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[tokio::test]
    async fn existing_session_is_reused_without_new_cookie() {
        let state = get_test_state();
        let server = get_test_server(state.clone());
        let session_id = SessionId::new();

        let response = server
            .post("/transactions")
            .add_cookie(Cookie::new(COOKIE_SESSION_ID, session_id.to_string()))
            .json(&json!({ "title": "Salary", "amount": 8000, "type": "credit" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert!(response.maybe_cookie(COOKIE_SESSION_ID).is_none());

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(list_entries(session_id, &connection).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_session_cookie_is_replaced() {
        let server = get_test_server(get_test_state());

        let response = server
            .post("/transactions")
            .add_cookie(Cookie::new(COOKIE_SESSION_ID, "FOOBAR"))
            .json(&json!({ "title": "Salary", "amount": 8000, "type": "credit" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let cookie = response.cookie(COOKIE_SESSION_ID);
        assert!(SessionId::parse(cookie.value()).is_some());
    }

    #[tokio::test]
    async fn rejects_empty_title() {
        let server = get_test_server(get_test_state());

        let response = server
            .post("/transactions")
            .json(&json!({ "title": "", "amount": 1000, "type": "credit" }))
            .await;

        response.assert_status_bad_request();
        assert!(response.maybe_cookie(COOKIE_SESSION_ID).is_none());
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let server = get_test_server(get_test_state());

        server
            .post("/transactions")
            .json(&json!({ "title": "Refund", "amount": -1000, "type": "credit" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn rejects_unknown_type() {
        let server = get_test_server(get_test_state());

        server
            .post("/transactions")
            .json(&json!({ "title": "Refund", "amount": 1000, "type": "transfer" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn rejects_fractional_amount() {
        let server = get_test_server(get_test_state());

        server
            .post("/transactions")
            .json(&json!({ "title": "Coffee", "amount": 4.5, "type": "debit" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn rejects_missing_fields() {
        let server = get_test_server(get_test_state());

        let response = server
            .post("/transactions")
            .json(&json!({ "title": "Coffee" }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn rejects_amount_outside_integer_range() {
        let server = get_test_server(get_test_state());

        server
            .post("/transactions")
            .json(&json!({ "title": "Lottery", "amount": 1e30, "type": "credit" }))
            .await
            .assert_status_bad_request();
    }
}
