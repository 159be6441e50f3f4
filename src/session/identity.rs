//! Defines the session token and how a request's session is resolved.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque token identifying one anonymous session.
///
/// The token is a random (version 4) UUID, giving 122 bits of entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session ID from its text form.
    ///
    /// Returns `None` if `text` is not a well-formed UUID.
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text.trim()).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl ToSql for SessionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for SessionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Uuid::parse_str(text)
            .map(Self)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Resolve the session for a request from the token it presented, if any.
///
/// A well-formed `presented` token is returned unchanged along with `false`.
/// If the token is missing or malformed, a fresh session ID is generated and
/// returned along with `true`, in which case the caller is responsible for
/// handing the new token back to the client.
///
/// Tokens are not checked against any registry: any well-formed token names
/// a session.
pub fn resolve(presented: Option<&str>) -> (SessionId, bool) {
    match presented.and_then(SessionId::parse) {
        Some(session_id) => (session_id, false),
        None => (SessionId::new(), true),
    }
}
