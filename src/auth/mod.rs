//! User accounts and cookie-based sessions.
//!
//! The rest of the application only sees the [UserID] that [auth_guard]
//! places in the request extensions.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::post_log_in;
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::register_user;
pub use user::{User, UserID, create_user, create_user_table, get_user_by_id};
