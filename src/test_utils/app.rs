use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use serde_json::json;

use crate::{
    AppState, User,
    auth::COOKIE_TOKEN,
    build_router, endpoints,
    test_utils::{TEST_PASSWORD, create_test_user, get_test_app_state},
};

/// A server running the full router with one registered user logged in.
pub(crate) struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub user: User,
    pub auth_cookie: Cookie<'static>,
}

impl TestApp {
    pub fn create_user(&self, email: &str) -> User {
        create_test_user(email, &self.state)
    }

    pub async fn log_in(&self, email: &str) -> Cookie<'static> {
        let response = self
            .server
            .post(endpoints::LOG_IN_API)
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .await;
        response.assert_status_ok();

        response.cookie(COOKIE_TOKEN)
    }

    pub async fn log_in_as_new_user(&self, email: &str) -> Cookie<'static> {
        self.create_user(email);
        self.log_in(email).await
    }
}

pub(crate) async fn spawn_logged_in_app() -> TestApp {
    let state = get_test_app_state();
    let user = create_test_user("ada@example.com", &state);
    let server =
        TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

    let mut app = TestApp {
        server,
        state,
        user,
        auth_cookie: Cookie::new(COOKIE_TOKEN, ""),
    };
    app.auth_cookie = app.log_in("ada@example.com").await;

    app
}
