//! Savings goals and their progress.

mod core;
mod endpoints;
mod progress;

pub use core::{
    Goal, GoalUpdate, NewGoal, create_goal, create_goal_table, delete_goal, get_goal,
    get_owned_goal, list_goals_by_user, map_goal_row, update_goal, update_goal_balance,
};
pub use endpoints::{
    GoalState, create_goal_endpoint, delete_goal_endpoint, edit_goal_endpoint,
    get_goal_endpoint, get_goal_progress_endpoint, list_goals_endpoint,
};
pub use progress::{GoalProgress, ProgressSnapshot, evaluate, get_goal_progress};
