//! The dense history series endpoint.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::UserID,
    history::{
        BucketTotals, HistoryPlan, HistoryQuery, HistoryState, get_sparse_buckets, reindex_dense,
    },
    user_settings::require_user_settings,
};

/// One bucket of a history series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    /// The calendar year.
    pub year: i32,
    /// The zero-based month.
    pub month: u8,
    /// The day of the month, only set for daily series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
    /// The total amount earned in the bucket.
    pub income: f64,
    /// The total amount spent in the bucket.
    pub expense: f64,
}

/// Build the owner's history series for `plan` with one row for every bucket,
/// in bucket order. Buckets without transactions have zero income and expense.
///
/// # Errors
/// Returns an [Error::SqlError] if the aggregates cannot be read.
pub fn build_history(
    user_id: UserID,
    plan: HistoryPlan,
    connection: &Connection,
) -> Result<Vec<HistoryRow>, Error> {
    let sparse = get_sparse_buckets(user_id, plan, connection)?;
    let dense = reindex_dense(sparse, plan.bucket_range(), BucketTotals::default);

    let rows = dense
        .into_iter()
        .map(|(index, totals)| {
            let (month, day) = match plan {
                HistoryPlan::Yearly { .. } => (index, None),
                HistoryPlan::Monthly { month, .. } => (month, Some(index)),
            };

            HistoryRow {
                year: plan.year(),
                month,
                day,
                income: totals.income,
                expense: totals.expense,
            }
        })
        .collect();

    Ok(rows)
}

/// A route handler for the owner's monthly (`timeframe=year`) or daily
/// (`timeframe=month`) income and expense history.
pub async fn get_history(
    State(state): State<HistoryState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRow>>, Error> {
    let plan = HistoryPlan::try_from(query)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    require_user_settings(user_id, &connection)?;

    build_history(user_id, plan, &connection).map(Json)
}
