//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    auth::{auth_guard, get_log_out, post_log_in, register_user},
    dashboard::get_dashboard_endpoint,
    endpoints,
    goal::{
        create_goal_endpoint, delete_goal_endpoint, edit_goal_endpoint, get_goal_endpoint,
        get_goal_progress_endpoint, list_goals_endpoint,
    },
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, get_goal_audit_endpoint, list_goal_transactions_endpoint,
        list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out));

    let protected_routes = Router::new()
        .route(
            endpoints::GOALS,
            get(list_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::GOAL,
            get(get_goal_endpoint)
                .put(edit_goal_endpoint)
                .delete(delete_goal_endpoint),
        )
        .route(endpoints::GOAL_PROGRESS, get(get_goal_progress_endpoint))
        .route(
            endpoints::GOAL_TRANSACTIONS,
            get(list_goal_transactions_endpoint),
        )
        .route(endpoints::GOAL_AUDIT, get(get_goal_audit_endpoint))
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::DASHBOARD_API, get(get_dashboard_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}
