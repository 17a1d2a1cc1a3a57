//! Per-category totals over a date range.

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

/// The summed amount of one category over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// Whether the category is for income or expenses.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The category name recorded on the transactions.
    pub category: String,
    /// The category icon recorded on the transactions.
    pub category_icon: String,
    /// The sum of the transaction amounts.
    pub sum_amount: f64,
}

/// Sum the owner's transaction amounts per category over `date_range`.
///
/// The totals are ordered largest first, ties broken by category name, so the
/// client can rank categories without sorting them again.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_category_totals(
    user_id: UserID,
    date_range: DateRange,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT type, category, category_icon, TOTAL(amount) AS sum_amount
             FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             GROUP BY type, category, category_icon
             ORDER BY sum_amount DESC, category ASC",
        )?
        .query_map(
            (user_id.as_i64(), date_range.from(), date_range.to()),
            |row| {
                Ok(CategoryTotal {
                    transaction_type: row.get(0)?,
                    category: row.get(1)?,
                    category_icon: row.get(2)?,
                    sum_amount: row.get(3)?,
                })
            },
        )?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

/// A route handler for the owner's per-category totals between `from` and `to`.
pub async fn get_category_stats(
    State(state): State<StatsState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<CategoryTotal>>, Error> {
    let date_range = DateRange::try_from(query)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    require_user_settings(user_id, &connection)?;

    get_category_totals(user_id, date_range, &connection).map(Json)
}
