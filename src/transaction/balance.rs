//! The rules for moving money into and out of a goal.
//!
//! Nothing here touches the database, [crate::transaction::record_transaction]
//! stores the outcome.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    goal::Goal,
    transaction::{NewTransaction, Transaction, TransactionKind},
};

/// A request to move money into or out of a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// How much money to move.
    pub amount: Decimal,
    /// Whether to add money to the goal or remove it.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// An optional note about the transaction.
    #[serde(default)]
    pub description: Option<String>,
}

/// Decide whether `user_id` may apply `request` to `goal` and work out the result.
///
/// On success, returns `goal` with its new balance and the transaction to be
/// recorded alongside it. Deposits may take the balance past the target.
///
/// # Errors
/// This function will return a:
/// - [Error::AccessDenied] if `goal` belongs to another user,
/// - [Error::InvalidAmount] if the amount is not positive or a deposit would
///   overflow the balance,
/// - or [Error::InsufficientFunds] if a withdrawal is larger than the balance.
pub fn apply(
    mut goal: Goal,
    request: TransactionRequest,
    user_id: UserID,
    now: OffsetDateTime,
) -> Result<(Goal, NewTransaction), Error> {
    if goal.user_id != user_id {
        return Err(Error::AccessDenied);
    }

    if request.amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount);
    }

    goal.current_amount = match request.kind {
        TransactionKind::Deposit => goal
            .current_amount
            .checked_add(request.amount)
            .ok_or(Error::InvalidAmount)?,
        TransactionKind::Withdrawal if request.amount > goal.current_amount => {
            return Err(Error::InsufficientFunds {
                available: goal.current_amount,
                requested: request.amount,
            });
        }
        TransactionKind::Withdrawal => goal.current_amount - request.amount,
    };

    let description = request
        .description
        .map(|description| description.trim().to_owned())
        .filter(|description| !description.is_empty());

    let new_transaction = NewTransaction {
        user_id,
        goal_id: goal.id,
        amount: request.amount,
        description,
        kind: request.kind,
        created_at: now,
    };

    Ok((goal, new_transaction))
}

/// The balance implied by a goal's ledger: deposits minus withdrawals.
///
/// The order of `transactions` does not matter.
pub fn ledger_balance(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .fold(Decimal::ZERO, |balance, transaction| match transaction.kind {
            TransactionKind::Deposit => balance.saturating_add(transaction.amount),
            TransactionKind::Withdrawal => balance.saturating_sub(transaction.amount),
        })
}
