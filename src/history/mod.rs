//! Dense income and expense history series.
//!
//! A history request is resolved into a [HistoryPlan], the sums of the buckets
//! holding transactions are read from the aggregate tables, and the sparse result
//! is reindexed over every bucket of the plan so that empty months and days show
//! up as zeros.

mod endpoint;
mod period;
mod periods;
mod query;
mod reindex;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use endpoint::{HistoryRow, build_history, get_history};
pub use period::{HistoryPlan, HistoryQuery};
pub use periods::get_history_periods;
pub use query::{BucketTotals, get_active_years, get_sparse_buckets};
pub use reindex::reindex_dense;

/// The state needed for the history endpoints.
#[derive(Debug, Clone)]
pub struct HistoryState {
    /// The database connection for reading aggregates and settings.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
