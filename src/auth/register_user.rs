//! The endpoint for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error, JsonBody,
    auth::{PasswordHash, ValidatedPassword, cookie::set_auth_cookie, user::create_user},
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The bcrypt cost used to hash new passwords.
    pub password_cost: u32,
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            password_cost: state.password_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The registration details submitted by a new user.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A route handler for registering a new user.
///
/// On success the user is logged in straight away and the new user is returned
/// with the status 201 Created.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    JsonBody(user_data): JsonBody<RegisterData>,
) -> Result<Response, Error> {
    let validated_password = ValidatedPassword::new(
        &user_data.password,
        &[user_data.name.as_str(), user_data.email.as_str()],
    )?;

    let password_hash = PasswordHash::new(validated_password, state.password_cost)
        .inspect_err(|error| tracing::error!("an error occurred while hashing a password: {error}"))?;

    let user = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        create_user(
            &user_data.name,
            &user_data.email,
            password_hash,
            OffsetDateTime::now_utc(),
            &connection,
        )?
    };

    tracing::info!("Registered user {}", user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((StatusCode::CREATED, jar, Json(user)).into_response())
}
