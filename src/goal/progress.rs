//! Derives how far along a goal is from its balance and deadline.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, GoalId, UserID, goal::Goal, goal::get_owned_goal};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The progress of a goal at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// The percentage of the target amount saved, between 0 and 100.
    pub progress: Decimal,
    /// Whole days left until the deadline, zero once it has passed.
    pub days_remaining: i64,
    /// Whether the current amount has reached the target amount.
    pub is_completed: bool,
}

/// A goal together with its progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    /// The goal the progress was calculated for.
    pub goal: Goal,
    /// The progress of `goal`.
    #[serde(flatten)]
    pub snapshot: ProgressSnapshot,
}

impl GoalProgress {
    /// Calculate the progress of `goal` as of `now`.
    pub fn new(goal: Goal, now: OffsetDateTime) -> Self {
        let snapshot = evaluate(&goal, now);

        Self { goal, snapshot }
    }
}

/// Calculate the progress of `goal` as of `now`.
///
/// Saving more than the target counts as 100% progress.
pub fn evaluate(goal: &Goal, now: OffsetDateTime) -> ProgressSnapshot {
    ProgressSnapshot {
        progress: progress_percentage(goal.current_amount, goal.target_amount),
        days_remaining: (goal.deadline - now).whole_days().max(0),
        is_completed: goal.current_amount >= goal.target_amount,
    }
}

fn progress_percentage(current_amount: Decimal, target_amount: Decimal) -> Decimal {
    if target_amount.is_zero() {
        return Decimal::ZERO;
    }

    current_amount
        .checked_div(target_amount)
        .and_then(|ratio| ratio.checked_mul(ONE_HUNDRED))
        // Only a huge overshoot can overflow.
        .unwrap_or(ONE_HUNDRED)
        .clamp(Decimal::ZERO, ONE_HUNDRED)
}

/// Get the progress of the goal `goal_id` for `user_id` as of `now`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such goal, or
/// [Error::AccessDenied] if the goal belongs to another user.
pub fn get_goal_progress(
    user_id: UserID,
    goal_id: GoalId,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<GoalProgress, Error> {
    let goal = get_owned_goal(user_id, goal_id, connection)?;

    Ok(GoalProgress::new(goal, now))
}
