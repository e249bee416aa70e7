//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, GoalId, TransactionId, UserID, money::get_decimal};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction puts money into a goal or takes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money added to the goal.
    #[serde(rename = "add")]
    Deposit,
    /// Money taken out of the goal.
    #[serde(rename = "remove")]
    Withdrawal,
}

impl TransactionKind {
    /// The name used for the kind in the database and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "add",
            TransactionKind::Withdrawal => "remove",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "add" => Ok(TransactionKind::Deposit),
            "remove" => Ok(TransactionKind::Withdrawal),
            other => Err(FromSqlError::Other(
                format!("unknown transaction kind {other:?}").into(),
            )),
        }
    }
}

/// A deposit into or withdrawal from a goal.
///
/// Transactions are never edited once stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that made the transaction, always the owner of the goal.
    pub user_id: UserID,
    /// The goal the money went into or came out of.
    pub goal_id: GoalId,
    /// How much money moved. Always greater than zero.
    pub amount: Decimal,
    /// An optional note about the transaction.
    pub description: Option<String>,
    /// Whether the money went in or out.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A transaction that has been checked against its goal but not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The user that made the transaction.
    pub user_id: UserID,
    /// The goal the money went into or came out of.
    pub goal_id: GoalId,
    /// How much money moved.
    pub amount: Decimal,
    /// An optional note about the transaction.
    pub description: Option<String>,
    /// Whether the money went in or out.
    pub kind: TransactionKind,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table.
///
/// Deleting a goal deletes its transactions.
///
/// # Errors
/// Returns an error if the SQL query failed.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            goal_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            description TEXT,
            kind TEXT NOT NULL CHECK (kind IN ('add', 'remove')),
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(goal_id) REFERENCES goal(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_goal ON \"transaction\"(goal_id)",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_created
         ON \"transaction\"(user_id, created_at)",
        (),
    )?;

    Ok(())
}

/// Store a transaction in the ledger.
///
/// This does not touch the goal's balance, use
/// [crate::transaction::record_transaction] to keep the two in step.
///
/// # Errors
/// Returns [Error::StorageFailure] if the goal or user does not exist or
/// there is some other SQL error.
pub fn append_transaction(
    new_transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, goal_id, amount, description, kind, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, goal_id, amount, description, kind, created_at",
        )?
        .query_row(
            (
                new_transaction.user_id.as_i64(),
                new_transaction.goal_id,
                new_transaction.amount.to_string(),
                &new_transaction.description,
                new_transaction.kind,
                new_transaction.created_at,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the ledger of the goal with `goal_id`, newest first.
///
/// # Errors
/// Returns [Error::StorageFailure] if there is an SQL error.
pub fn list_transactions_by_goal(
    goal_id: GoalId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, goal_id, amount, description, kind, created_at
             FROM \"transaction\" WHERE goal_id = :goal_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":goal_id", &goal_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Retrieve every transaction made by `user_id` across all of their goals,
/// newest first.
///
/// # Errors
/// Returns [Error::StorageFailure] if there is an SQL error.
pub fn list_transactions_by_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, goal_id, amount, description, kind, created_at
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Map a database row to a [Transaction].
///
/// Expects the columns in the order: id, user_id, goal_id, amount,
/// description, kind, created_at.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        goal_id: row.get(2)?,
        amount: get_decimal(row, 3)?,
        description: row.get(4)?,
        kind: row.get(5)?,
        created_at: row.get(6)?,
    })
}
