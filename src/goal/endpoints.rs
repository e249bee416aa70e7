//! Route handlers for creating, reading, editing and deleting goals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error, GoalId, JsonBody, UserID,
    db::acquire_connection,
    endpoints::{self, format_endpoint},
    goal::{
        Goal, GoalProgress, GoalUpdate, NewGoal, create_goal, delete_goal, get_goal_progress,
        get_owned_goal, list_goals_by_user, update_goal,
    },
};

/// The state needed to manage goals.
#[derive(Debug, Clone)]
pub struct GoalState {
    /// The database connection for managing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new goal, responds with the goal and 201 Created.
///
/// The `Location` header points at the new goal.
pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(new_goal): JsonBody<NewGoal>,
) -> Result<Response, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    let goal = create_goal(user_id, new_goal, OffsetDateTime::now_utc(), &connection)?;
    tracing::info!("User {user_id} created goal {}", goal.id);

    let location = format_endpoint(endpoints::GOAL, goal.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(goal)).into_response())
}

/// A route handler that lists the user's goals, newest first.
pub async fn list_goals_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Goal>>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    list_goals_by_user(user_id, &connection).map(Json)
}

/// A route handler for getting a single goal.
pub async fn get_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<Json<Goal>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    get_owned_goal(user_id, goal_id, &connection).map(Json)
}

/// A route handler for changing the title, target amount or deadline of a goal.
pub async fn edit_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
    JsonBody(update): JsonBody<GoalUpdate>,
) -> Result<Json<Goal>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    update_goal(user_id, goal_id, update, &connection).map(Json)
}

/// A route handler for deleting a goal and its transactions, responds with 204 No Content.
pub async fn delete_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<StatusCode, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    delete_goal(user_id, goal_id, &connection)?;
    tracing::info!("User {user_id} deleted goal {goal_id}");

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for getting the progress of a goal as of now.
pub async fn get_goal_progress_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<Json<GoalProgress>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    get_goal_progress(user_id, goal_id, OffsetDateTime::now_utc(), &connection).map(Json)
}

#[cfg(test)]
mod create_goal_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{endpoints, test_utils::spawn_logged_in_app};

    #[tokio::test]
    async fn creates_goal_with_zero_balance() {
        let app = spawn_logged_in_app().await;

        let response = app
            .server
            .post(endpoints::GOALS)
            .add_cookie(app.auth_cookie.clone())
            .json(&json!({
                "title": "New bike",
                "target_amount": 750,
                "deadline": "2030-01-01T00:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["title"], "New bike");
        assert_eq!(body["target_amount"].as_f64(), Some(750.0));
        assert_eq!(body["current_amount"].as_f64(), Some(0.0));
        assert_eq!(body["user_id"], app.user.id.as_i64());
        assert_eq!(
            response.header("location"),
            format!("/api/goals/{}", body["id"])
        );
    }

    #[tokio::test]
    async fn keeps_exact_target_amount() {
        let app = spawn_logged_in_app().await;
        let body = serde_json::from_str::<serde_json::Value>(
            r#"{"title": "House", "target_amount": 98765432109876.54321, "deadline": "2040-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let response = app
            .server
            .post(endpoints::GOALS)
            .add_cookie(app.auth_cookie.clone())
            .json(&body)
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["target_amount"].to_string(), "98765432109876.54321");
    }

    #[tokio::test]
    async fn rejects_missing_fields_with_json_error() {
        let app = spawn_logged_in_app().await;

        let response = app
            .server
            .post(endpoints::GOALS)
            .add_cookie(app.auth_cookie.clone())
            .json(&json!({ "title": "No target" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<serde_json::Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn rejects_zero_target() {
        let app = spawn_logged_in_app().await;

        let response = app
            .server
            .post(endpoints::GOALS)
            .add_cookie(app.auth_cookie.clone())
            .json(&json!({
                "title": "Nothing",
                "target_amount": 0,
                "deadline": "2030-01-01T00:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn requires_log_in() {
        let app = spawn_logged_in_app().await;

        let response = app
            .server
            .post(endpoints::GOALS)
            .json(&json!({
                "title": "New bike",
                "target_amount": 750,
                "deadline": "2030-01-01T00:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
