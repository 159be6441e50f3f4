//! Carries the session token between the server and the client in a cookie.

use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use time::Duration;

use super::SessionId;

/// The name of the cookie holding the session token.
pub const COOKIE_SESSION_ID: &str = "sessionId";
/// How long a client should keep a newly issued session cookie.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::days(7);

/// Add the session cookie for `session_id` to `jar`.
///
/// The cookie is valid for the whole site and expires after `duration`.
///
/// Returns the cookie jar with the cookie added.
pub fn set_session_cookie(jar: CookieJar, session_id: SessionId, duration: Duration) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION_ID, session_id.to_string()))
            .path("/")
            .max_age(duration)
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Get the session ID from the session cookie in `jar`.
///
/// Returns `None` if the cookie is missing or does not hold a well-formed token.
pub fn get_session_id(jar: &CookieJar) -> Option<SessionId> {
    jar.get(COOKIE_SESSION_ID)
        .and_then(|cookie| SessionId::parse(cookie.value_trimmed()))
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{
        CookieJar,
        cookie::{Cookie, SameSite},
    };
    use time::Duration;

    use crate::session::{
        COOKIE_SESSION_ID, DEFAULT_COOKIE_DURATION, SessionId, get_session_id, set_session_cookie,
    };

    #[test]
    fn default_duration_is_seven_days() {
        assert_eq!(DEFAULT_COOKIE_DURATION, Duration::days(7));
    }

    #[test]
    fn can_set_cookie() {
        let session_id = SessionId::new();

        let jar = set_session_cookie(CookieJar::new(), session_id, DEFAULT_COOKIE_DURATION);
        let cookie = jar.get(COOKIE_SESSION_ID).unwrap();

        assert_eq!(cookie.value(), session_id.to_string());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(DEFAULT_COOKIE_DURATION));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn get_session_id_from_cookie_succeeds() {
        let session_id = SessionId::new();
        let jar = set_session_cookie(CookieJar::new(), session_id, DEFAULT_COOKIE_DURATION);

        assert_eq!(get_session_id(&jar), Some(session_id));
    }

    #[test]
    fn get_session_id_without_cookie_returns_none() {
        assert_eq!(get_session_id(&CookieJar::new()), None);
    }

    #[test]
    fn get_session_id_with_malformed_cookie_returns_none() {
        let jar = CookieJar::new().add(Cookie::new(COOKIE_SESSION_ID, "FOOBAR"));

        assert_eq!(get_session_id(&jar), None);
    }
}
