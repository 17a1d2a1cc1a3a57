//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, auth::UserID, database_id::TransactionId, transaction::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the logged in user's transactions.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(user_id, transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use time::macros::date;

    use crate::{
        Error, TransactionType,
        endpoints::{self, format_endpoint},
        test_utils::TestApp,
        transaction::get_transaction,
    };

    #[tokio::test]
    async fn deletes_transaction() {
        let app = TestApp::new();
        let (user, cookie) = app.log_in_new_user("alice").await;
        let transaction = app.insert_transaction(
            &user,
            TransactionType::Expense,
            "Food",
            9.99,
            date!(2024 - 01 - 01),
        );

        let response = app
            .server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .add_cookie(cookie)
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(
            get_transaction(user.id, transaction.id, &app.connection()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let app = TestApp::new();
        let (_, cookie) = app.log_in_new_user("alice").await;

        let response = app
            .server
            .delete(&format_endpoint(endpoints::TRANSACTION, 42))
            .add_cookie(cookie)
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn cannot_delete_other_owners_transaction() {
        let app = TestApp::new();
        let (alice, _) = app.log_in_new_user("alice").await;
        let (_, bob_cookie) = app.log_in_new_user("bob").await;
        let transaction = app.insert_transaction(
            &alice,
            TransactionType::Expense,
            "Food",
            9.99,
            date!(2024 - 01 - 01),
        );

        let response = app
            .server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .add_cookie(bob_cookie)
            .await;

        response.assert_status_not_found();
        assert!(get_transaction(alice.id, transaction.id, &app.connection()).is_ok());
    }
}
