//! Dashboard HTTP handler and the query that gathers its data.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error, UserID,
    dashboard::aggregation::{DashboardStats, summarize},
    db::acquire_connection,
    goal::list_goals_by_user,
    transaction::list_transactions_by_user,
};

/// The state needed for displaying the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading goals and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Gather the dashboard statistics for `user_id` as of `now`.
///
/// # Errors
/// Returns [Error::StorageFailure] if the goals or transactions could not be read.
pub fn get_dashboard(
    user_id: UserID,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<DashboardStats, Error> {
    let goals = list_goals_by_user(user_id, connection)?;
    let transactions = list_transactions_by_user(user_id, connection)?;

    Ok(summarize(goals, transactions, now))
}

/// Route handler for the dashboard statistics.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<DashboardStats>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    get_dashboard(user_id, OffsetDateTime::now_utc(), &connection).map(Json)
}
