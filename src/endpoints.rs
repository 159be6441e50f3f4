//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{entry_id}', use [format_endpoint].

/// The route for recording entries (POST) and listing a session's entries (GET).
pub const TRANSACTIONS: &str = "/transactions";
/// The route for getting a session's balance.
pub const SUMMARY: &str = "/transactions/summary";
/// The route for getting a single entry.
pub const TRANSACTION: &str = "/transactions/{entry_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/transactions/{entry_id}', '{entry_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
