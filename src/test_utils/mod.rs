#![allow(missing_docs)]

pub(crate) mod app;
pub(crate) mod db;
pub(crate) mod http;

pub(crate) use app::{TestApp, spawn_logged_in_app};
pub(crate) use db::{
    TEST_PASSWORD, create_test_db_user, create_test_user, get_test_app_state, get_test_connection,
};
pub(crate) use http::parse_json_body;
