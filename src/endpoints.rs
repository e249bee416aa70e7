//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/goals/{goal_id}', use [format_endpoint].

/// The route for registering a new user.
pub const USERS: &str = "/api/users";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to list and create goals.
pub const GOALS: &str = "/api/goals";
/// The route to get, edit and delete a single goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route for the progress of a goal.
pub const GOAL_PROGRESS: &str = "/api/goals/{goal_id}/progress";
/// The route for the transactions of a goal.
pub const GOAL_TRANSACTIONS: &str = "/api/goals/{goal_id}/transactions";
/// The route for checking a goal's balance against its transactions.
pub const GOAL_AUDIT: &str = "/api/goals/{goal_id}/audit";
/// The route to list and record transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for the dashboard statistics.
pub const DASHBOARD_API: &str = "/api/dashboard";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
