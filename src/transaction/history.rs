//! The transaction history for a date range, with amounts formatted in the owner's currency.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, CurrencyFormatter, Error,
    auth::UserID,
    stats::{DateRange, DateRangeQuery},
    transaction::{Transaction, get_transactions_in_range},
    user_settings::require_user_settings,
};

/// The state needed for the transaction history endpoint.
#[derive(Debug, Clone)]
pub struct TransactionHistoryState {
    /// The database connection for reading transactions and settings.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionHistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A transaction along with its amount formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistoryRow {
    #[serde(flatten)]
    transaction: Transaction,
    formatted_amount: String,
}

/// A route handler that lists the owner's transactions dated within `from` and `to`, oldest first.
pub async fn get_transaction_history(
    State(state): State<TransactionHistoryState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<TransactionHistoryRow>>, Error> {
    let date_range = DateRange::try_from(query)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let settings = require_user_settings(user_id, &connection)?;
    let formatter = CurrencyFormatter::new(settings.currency)?;

    let rows = get_transactions_in_range(user_id, date_range, &connection)?
        .into_iter()
        .map(|transaction| TransactionHistoryRow {
            formatted_amount: formatter.format(transaction.amount),
            transaction,
        })
        .collect();

    Ok(Json(rows))
}
