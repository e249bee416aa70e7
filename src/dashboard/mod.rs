//! The dashboard: a summary of a user's goals and recent transactions.

mod aggregation;
mod handlers;

pub use aggregation::{
    DashboardStats, RECENT_GOALS_LIMIT, RECENT_TRANSACTIONS_LIMIT, summarize,
};
pub use handlers::{DashboardState, get_dashboard, get_dashboard_endpoint};
