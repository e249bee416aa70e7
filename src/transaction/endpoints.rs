//! Route handlers for recording and listing transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error, GoalId, JsonBody, UserID,
    db::acquire_connection,
    goal::get_owned_goal,
    transaction::{
        BalanceAudit, Transaction, TransactionKind, TransactionRequest, audit_goal_balance,
        create_transaction, list_transactions_by_goal, list_transactions_by_user,
    },
};

/// The state needed to record and list transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for recording a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    /// The goal to move money into or out of.
    pub goal_id: GoalId,
    /// How much money to move.
    pub amount: Decimal,
    /// Either "add" or "remove".
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// An optional note about the transaction.
    #[serde(default)]
    pub description: Option<String>,
}

/// A route handler for recording a deposit or withdrawal, responds with the
/// transaction and 201 Created.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<TransactionData>,
) -> Result<Response, Error> {
    let request = TransactionRequest {
        amount: data.amount,
        kind: data.kind,
        description: data.description,
    };

    let mut connection = acquire_connection(&state.db_connection)?;
    let transaction = create_transaction(
        user_id,
        data.goal_id,
        request,
        OffsetDateTime::now_utc(),
        &mut connection,
    )?;

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}

/// A route handler that lists every transaction the user has made, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    list_transactions_by_user(user_id, &connection).map(Json)
}

/// A route handler that lists the transactions of one goal, newest first.
pub async fn list_goal_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    get_owned_goal(user_id, goal_id, &connection)?;

    list_transactions_by_goal(goal_id, &connection).map(Json)
}

/// A route handler that checks a goal's balance against its transactions.
pub async fn get_goal_audit_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<GoalId>,
) -> Result<Json<BalanceAudit>, Error> {
    let connection = acquire_connection(&state.db_connection)?;

    audit_goal_balance(user_id, goal_id, &connection).map(Json)
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use axum::{body::Bytes, http::StatusCode};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        endpoints,
        goal::{Goal, NewGoal, create_goal, get_goal},
        test_utils::{TestApp, spawn_logged_in_app},
        transaction::{TransactionData, TransactionKind, list_transactions_by_goal},
    };

    fn create_test_goal(app: &TestApp) -> Goal {
        let connection = app.state.db_connection.lock().unwrap();

        create_goal(
            app.user.id,
            NewGoal {
                title: "Guitar".to_owned(),
                target_amount: dec!(100),
                deadline: datetime!(2030-01-01 00:00 UTC),
            },
            datetime!(2025-01-01 00:00 UTC),
            &connection,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn deposit_updates_goal_balance() {
        let app = spawn_logged_in_app().await;
        let goal = create_test_goal(&app);

        let response = app
            .server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(app.auth_cookie.clone())
            .json(&json!({
                "goal_id": goal.id,
                "amount": 60,
                "type": "add",
                "description": "Savings",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["goal_id"], goal.id);
        assert_eq!(body["type"], "add");
        assert_eq!(body["amount"].as_f64(), Some(60.0));
        assert_eq!(body["description"], "Savings");

        let connection = app.state.db_connection.lock().unwrap();
        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(60)
        );
    }

    #[tokio::test]
    async fn overdraw_is_bad_request() {
        let app = spawn_logged_in_app().await;
        let goal = create_test_goal(&app);

        let response = app
            .server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(app.auth_cookie.clone())
            .json(&json!({ "goal_id": goal.id, "amount": 30, "type": "remove" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<serde_json::Value>();
        assert_eq!(
            body["error"],
            "insufficient funds: the goal holds 0 but 30 was requested"
        );
        let connection = app.state.db_connection.lock().unwrap();
        assert_eq!(list_transactions_by_goal(goal.id, &connection), Ok(vec![]));
    }

    #[tokio::test]
    async fn other_users_goal_is_forbidden() {
        let app = spawn_logged_in_app().await;
        let goal = create_test_goal(&app);
        let other_cookie = app.log_in_as_new_user("bob@example.com").await;

        let response = app
            .server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(other_cookie)
            .json(&json!({ "goal_id": goal.id, "amount": 5, "type": "add" }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let connection = app.state.db_connection.lock().unwrap();
        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(0)
        );
    }

    #[tokio::test]
    async fn amounts_keep_every_digit() {
        let app = spawn_logged_in_app().await;
        let goal = create_test_goal(&app);
        let body = format!(
            r#"{{"goal_id": {}, "amount": 12345678901234567.89, "type": "add"}}"#,
            goal.id
        );

        let response = app
            .server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(app.auth_cookie.clone())
            .bytes(Bytes::from(body))
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["amount"].to_string(), "12345678901234567.89");
        let connection = app.state.db_connection.lock().unwrap();
        assert_eq!(
            get_goal(goal.id, &connection).unwrap().current_amount,
            dec!(12345678901234567.89)
        );
    }

    #[test]
    fn transaction_data_parses_amounts_exactly() {
        let data: TransactionData = serde_json::from_str(
            r#"{"goal_id": 1, "amount": 12345678901234567.89, "type": "add"}"#,
        )
        .unwrap();

        assert_eq!(data.amount, dec!(12345678901234567.89));
        assert_eq!(data.kind, TransactionKind::Deposit);
        assert_eq!(data.description, None);
    }

    #[tokio::test]
    async fn unknown_type_is_rejected() {
        let app = spawn_logged_in_app().await;
        let goal = create_test_goal(&app);

        let response = app
            .server
            .post(endpoints::TRANSACTIONS_API)
            .add_cookie(app.auth_cookie.clone())
            .json(&json!({ "goal_id": goal.id, "amount": 5, "type": "transfer" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let message = response.json::<serde_json::Value>()["error"]
            .as_str()
            .unwrap()
            .to_owned();
        assert!(message.starts_with("invalid request"), "got {message}");
        let connection = app.state.db_connection.lock().unwrap();
        assert_eq!(get_goal(goal.id, &connection).unwrap().current_amount, dec!(0));
    }
}
