//! Anonymous session identity.
//!
//! A session is nothing more than a random token that partitions the ledger.
//! It is issued on the first write, carried by the client in a cookie, and
//! trusted as-is on every later request.

mod cookie;
mod identity;
mod middleware;

pub use cookie::{COOKIE_SESSION_ID, DEFAULT_COOKIE_DURATION, get_session_id, set_session_cookie};
pub use identity::{SessionId, resolve};
pub use middleware::session_guard;
