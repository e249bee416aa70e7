//! Folds a user's goals and transactions into the dashboard statistics.

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    goal::{Goal, GoalProgress},
    transaction::Transaction,
};

/// How many goals the dashboard shows as recent.
pub const RECENT_GOALS_LIMIT: usize = 5;
/// How many transactions the dashboard shows as recent.
pub const RECENT_TRANSACTIONS_LIMIT: usize = 10;

/// A summary of a user's savings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// The sum of the current amounts of every goal.
    pub total_savings: Decimal,
    /// How many goals the user has.
    pub total_goals: usize,
    /// How many goals have reached their target.
    pub completed_goals: usize,
    /// The mean progress across all goals, zero when there are no goals.
    pub average_progress: Decimal,
    /// The first few goals in the order given.
    pub recent_goals: Vec<Goal>,
    /// The first few transactions in the order given.
    pub recent_transactions: Vec<Transaction>,
    /// The progress of every goal, in the order given.
    pub goal_progress: Vec<GoalProgress>,
}

/// Summarise `goals` and `transactions` as of `now`.
///
/// Both lists are expected newest first. They are not re-sorted, so "recent"
/// means the front of each list.
pub fn summarize(
    goals: Vec<Goal>,
    transactions: Vec<Transaction>,
    now: OffsetDateTime,
) -> DashboardStats {
    let total_goals = goals.len();

    let recent_goals: Vec<Goal> = goals.iter().take(RECENT_GOALS_LIMIT).cloned().collect();
    let recent_transactions: Vec<Transaction> = transactions
        .into_iter()
        .take(RECENT_TRANSACTIONS_LIMIT)
        .collect();

    let goal_progress: Vec<GoalProgress> = goals
        .into_iter()
        .map(|goal| GoalProgress::new(goal, now))
        .collect();

    let total_savings = goal_progress
        .iter()
        .fold(Decimal::ZERO, |total, progress| {
            total.saturating_add(progress.goal.current_amount)
        });

    let completed_goals = goal_progress
        .iter()
        .filter(|progress| progress.snapshot.is_completed)
        .count();

    let average_progress = if total_goals == 0 {
        Decimal::ZERO
    } else {
        // Progress is capped at 100, so the sum cannot overflow.
        let total_progress: Decimal = goal_progress
            .iter()
            .map(|progress| progress.snapshot.progress)
            .sum();
        total_progress / Decimal::from(total_goals)
    };

    DashboardStats {
        total_savings,
        total_goals,
        completed_goals,
        average_progress,
        recent_goals,
        recent_transactions,
        goal_progress,
    }
}
