//! Records transactions and keeps goal balances in step with the ledger.

use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error, GoalId, UserID,
    goal::{get_goal, get_owned_goal, update_goal_balance},
    transaction::{
        Transaction, TransactionRequest, append_transaction, balance::apply, ledger_balance,
        list_transactions_by_goal,
    },
};

/// Apply `request` to the goal `goal_id` and store the transaction and the new
/// balance together.
///
/// The goal is read, checked, and written back inside one immediate SQL
/// transaction. If any step fails nothing is stored.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no such goal,
/// - [Error::AccessDenied], [Error::InvalidAmount] or [Error::InsufficientFunds]
///   if the request is rejected, see [apply],
/// - [Error::InconsistentState] if the transaction was stored but the balance
///   could not be updated,
/// - or [Error::StorageFailure] if there is some other SQL error.
pub fn record_transaction(
    user_id: UserID,
    goal_id: GoalId,
    request: TransactionRequest,
    now: OffsetDateTime,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let sql_transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let goal = get_goal(goal_id, &sql_transaction)?;
    let (goal, new_transaction) = apply(goal, request, user_id, now)?;
    let transaction = append_transaction(&new_transaction, &sql_transaction)?;

    update_goal_balance(goal.id, goal.current_amount, &sql_transaction).map_err(|error| {
        tracing::error!(
            "Could not update the balance of goal {goal_id} after storing transaction {}: {error}",
            transaction.id
        );
        Error::InconsistentState(format!(
            "balance of goal {goal_id} not updated for transaction {}: {error}",
            transaction.id
        ))
    })?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Record a deposit or withdrawal by `user_id` against the goal `goal_id`.
///
/// See [record_transaction] for the errors this may return.
pub fn create_transaction(
    user_id: UserID,
    goal_id: GoalId,
    request: TransactionRequest,
    now: OffsetDateTime,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let kind = request.kind;

    let transaction = record_transaction(user_id, goal_id, request, now, connection)
        .inspect_err(|error| {
            tracing::debug!("User {user_id} could not {kind} money for goal {goal_id}: {error}")
        })?;

    tracing::info!(
        "User {user_id} recorded transaction {} ({kind} {}) for goal {goal_id}",
        transaction.id,
        transaction.amount
    );

    Ok(transaction)
}

/// The result of checking a goal's stored balance against its ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceAudit {
    /// The goal that was checked.
    pub goal_id: GoalId,
    /// The balance stored on the goal.
    pub stored_balance: Decimal,
    /// The balance implied by the goal's transactions.
    pub ledger_balance: Decimal,
    /// Whether the two balances agree.
    pub is_consistent: bool,
}

/// Check that the balance stored on goal `goal_id` matches its transactions.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such goal,
/// [Error::AccessDenied] if the goal belongs to another user, or
/// [Error::StorageFailure] if there is some other SQL error.
pub fn audit_goal_balance(
    user_id: UserID,
    goal_id: GoalId,
    connection: &Connection,
) -> Result<BalanceAudit, Error> {
    let goal = get_owned_goal(user_id, goal_id, connection)?;
    let transactions = list_transactions_by_goal(goal_id, connection)?;
    let ledger_balance = ledger_balance(&transactions);
    let is_consistent = ledger_balance == goal.current_amount;

    if !is_consistent {
        tracing::error!(
            "Goal {goal_id} has a stored balance of {} but its ledger adds up to {ledger_balance}",
            goal.current_amount
        );
    }

    Ok(BalanceAudit {
        goal_id,
        stored_balance: goal.current_amount,
        ledger_balance,
        is_consistent,
    })
}
