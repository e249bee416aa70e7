use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{AppState, PasswordHash, User, ValidatedPassword, create_user, db::initialize};

pub(crate) const TEST_PASSWORD: &str = "iamtestingwhethericancreateanewuser";

/// The lowest cost bcrypt accepts, keeps hashing fast in tests.
pub(crate) const TEST_PASSWORD_COST: u32 = 4;

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

pub(crate) fn get_test_app_state() -> AppState {
    let db_connection =
        Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
    let mut state = AppState::new(db_connection, "foobar").expect("Could not create app state");
    state.password_cost = TEST_PASSWORD_COST;

    state
}

/// Insert a user whose password is [TEST_PASSWORD].
#[track_caller]
pub(crate) fn create_test_db_user(email: &str, connection: &Connection) -> User {
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        TEST_PASSWORD_COST,
    )
    .expect("Could not hash test password");

    create_user(
        "Test User",
        email,
        password_hash,
        OffsetDateTime::now_utc(),
        connection,
    )
    .expect("Could not create test user")
}

#[track_caller]
pub(crate) fn create_test_user(email: &str, state: &AppState) -> User {
    let connection = state
        .db_connection
        .lock()
        .expect("Could not acquire database lock");

    create_test_db_user(email, &connection)
}
