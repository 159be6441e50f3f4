//! Middleware that rejects requests that do not belong to a session.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::{Error, session::get_session_id};

/// Middleware function that checks for a well-formed session cookie.
///
/// The session ID is placed into the request extensions and the request is
/// executed normally if the cookie is valid, otherwise a `401 Unauthorized`
/// response is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session_id): Extension<SessionId>` to receive the session ID.
pub async fn session_guard(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let Some(session_id) = get_session_id(&jar) else {
        tracing::debug!(
            "Rejecting request to {} without a valid session cookie.",
            request.uri().path()
        );
        return Error::SessionMissing.into_response();
    };

    request.extensions_mut().insert(session_id);

    next.run(request).await
}
