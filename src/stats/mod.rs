//! Read-only statistics over an owner's transactions: balance totals and
//! per-category totals for an inclusive date range.

mod balance;
mod categories;
mod date_range;

pub use balance::{BalanceTotals, get_balance_stats, get_balance_totals};
pub use categories::{CategoryTotal, get_category_stats, get_category_totals};
pub use date_range::{DateRange, DateRangeQuery, parse_date};

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

/// The state needed for the stats endpoints.
#[derive(Debug, Clone)]
pub struct StatsState {
    /// The database connection for reading transactions and settings.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for StatsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
