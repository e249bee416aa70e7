//! The endpoint for logging out the current user.

use axum::{http::StatusCode, response::IntoResponse};
use axum_extra::extract::PrivateCookieJar;

/// Invalidate the auth cookie. Always succeeds, even when nobody is logged in.
pub async fn get_log_out(jar: PrivateCookieJar) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, super::cookie::invalidate_auth_cookie(jar))
}

#[cfg(test)]
mod log_out_tests {
    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use time::OffsetDateTime;

    use crate::{
        auth::{cookie::COOKIE_TOKEN, get_log_out},
        endpoints,
        test_utils::get_test_app_state,
    };

    #[tokio::test]
    async fn log_out_expires_auth_cookie() {
        let app = Router::new()
            .route(endpoints::LOG_OUT, get(get_log_out))
            .with_state(get_test_app_state());
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server.get(endpoints::LOG_OUT).await;

        response.assert_status(StatusCode::NO_CONTENT);
        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }
}
