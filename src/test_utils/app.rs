use std::sync::MutexGuard;

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;
use time::Date;

use crate::{
    AppState, Currency, Transaction, TransactionType, User, auth::COOKIE_TOKEN, build_router,
    endpoints, save_user_settings,
    test_utils::db::{TEST_PASSWORD, insert_test_user, insert_transaction},
};

/// A test server running the full router over an in-memory database.
pub(crate) struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let connection = Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(connection, "foobar", "Etc/UTC")
            .expect("Could not create app state.");
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        Self { server, state }
    }

    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.state
            .db_connection
            .lock()
            .expect("Could not acquire database lock")
    }

    /// Create `username` and log them in through the API, returning the auth cookie.
    pub async fn log_in_new_user(&self, username: &str) -> (User, Cookie<'static>) {
        let user = insert_test_user(&self.connection(), username);

        let response = self
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": username, "password": TEST_PASSWORD }))
            .await;
        response.assert_status_ok();

        (user, response.cookie(COOKIE_TOKEN))
    }

    /// Like [TestApp::log_in_new_user], but the user has also chosen `currency`.
    pub async fn log_in_onboarded_user(
        &self,
        username: &str,
        currency: Currency,
    ) -> (User, Cookie<'static>) {
        let (user, cookie) = self.log_in_new_user(username).await;
        save_user_settings(user.id, currency, &self.connection())
            .expect("Could not save user settings");

        (user, cookie)
    }

    pub fn insert_transaction(
        &self,
        user: &User,
        transaction_type: TransactionType,
        category: &str,
        amount: f64,
        date: Date,
    ) -> Transaction {
        insert_transaction(
            &self.connection(),
            user.id,
            transaction_type,
            category,
            amount,
            date,
        )
    }
}
