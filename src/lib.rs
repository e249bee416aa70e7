//! Piggybank is a web service for saving towards personal goals.
//!
//! Users register, create savings goals with a target amount and a deadline,
//! record deposits and withdrawals against those goals, and view a dashboard
//! summarising their progress.
//!
//! This library provides a JSON REST API. The rules that keep goal balances
//! consistent with the transaction ledger live in [transaction], progress
//! calculations live in [goal] and the dashboard statistics in [dashboard].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
pub mod dashboard;
mod database_id;
mod db;
mod endpoints;
pub mod goal;
mod json_body;
mod logging;
mod money;
mod not_found;
mod routing;
pub mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_id};
pub use database_id::{DatabaseId, GoalId, TransactionId};
pub use db::initialize as initialize_db;
pub use json_body::JsonBody;
pub use logging::logging_middleware;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction or target amount was zero, negative or too large to
    /// represent.
    #[error("amounts must be greater than zero")]
    InvalidAmount,

    /// A withdrawal asked for more money than the goal holds.
    ///
    /// Goal balances can never go below zero.
    #[error("insufficient funds: the goal holds {available} but {requested} was requested")]
    InsufficientFunds {
        /// The current balance of the goal.
        available: rust_decimal::Decimal,
        /// The amount the withdrawal asked for.
        requested: rust_decimal::Decimal,
    },

    /// The user tried to access a goal that belongs to another user.
    #[error("access denied")]
    AccessDenied,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    StorageFailure(rusqlite::Error),

    /// A ledger entry and its balance update could not be stored together.
    ///
    /// This should never happen. The unit of work is rolled back when this
    /// error is returned, but the request outcome must be treated as failed
    /// and the cause investigated by an operator. It is never retried.
    #[error("the goal balance could not be updated alongside its transaction: {0}")]
    InconsistentState(String),

    /// The request body was not valid JSON or did not have the expected fields.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A goal was given an empty title.
    #[error("goal title cannot be empty")]
    EmptyTitle,

    /// A user tried to register with an empty name.
    #[error("name cannot be empty")]
    EmptyName,

    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid auth cookie.
    #[error("you must be logged in to access this resource")]
    Unauthenticated,

    /// The email address is already registered to another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// There was an error formatting or parsing the expiry date of an auth
    /// token.
    #[error("could not format token expiry date-time: {0}")]
    InvalidDateFormat(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::StorageFailure(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {rejection}");
        Error::InvalidRequest(rejection.body_text())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidAmount
            | Error::InsufficientFunds { .. }
            | Error::InvalidRequest(_)
            | Error::EmptyTitle
            | Error::EmptyName
            | Error::TooWeak(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::AccessDenied => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::StorageFailure(_)
            | Error::InconsistentState(_)
            | Error::HashingError(_)
            | Error::InvalidDateFormat(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::InconsistentState(ref reason) => {
                tracing::error!(
                    "Ledger and goal balance could not be committed together, \
                    the request outcome is unknown: {reason}"
                );
                "The request failed, check the server logs for more details.".to_owned()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            ref error if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
