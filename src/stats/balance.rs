//! Income and expense totals over a date range.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error, TransactionType,
    auth::UserID,
    stats::{DateRange, DateRangeQuery, StatsState},
    user_settings::require_user_settings,
};

/// The summed income and expense of an owner over a date range.
///
/// Both totals are zero when there are no matching transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceTotals {
    /// The total amount earned.
    pub income: f64,
    /// The total amount spent.
    pub expense: f64,
}

/// Sum the owner's transaction amounts by type over `date_range`.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_balance_totals(
    user_id: UserID,
    date_range: DateRange,
    connection: &Connection,
) -> Result<BalanceTotals, Error> {
    let mut statement = connection.prepare(
        "SELECT type, TOTAL(amount) FROM \"transaction\"
         WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
         GROUP BY type",
    )?;

    let rows = statement.query_map(
        (user_id.as_i64(), date_range.from(), date_range.to()),
        |row| Ok((row.get::<_, TransactionType>(0)?, row.get::<_, f64>(1)?)),
    )?;

    let mut totals = BalanceTotals::default();

    for row in rows {
        match row? {
            (TransactionType::Income, sum) => totals.income = sum,
            (TransactionType::Expense, sum) => totals.expense = sum,
        }
    }

    Ok(totals)
}

/// A route handler for the owner's income and expense totals between `from` and `to`.
pub async fn get_balance_stats(
    State(state): State<StatsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<BalanceTotals>, Error> {
    let date_range = DateRange::try_from(query)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    require_user_settings(user_id, &connection)?;

    get_balance_totals(user_id, date_range, &connection).map(Json)
}
