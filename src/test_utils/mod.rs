#![allow(missing_docs)]

pub(crate) mod app;
pub(crate) mod db;
pub(crate) mod http;

pub(crate) use app::TestApp;
pub(crate) use db::{get_test_connection, insert_test_user, insert_transaction};
pub(crate) use http::response_json;
