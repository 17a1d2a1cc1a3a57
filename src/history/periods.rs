//! The years an owner can browse the history of.

use axum::{Extension, Json, extract::State};

use crate::{
    Error,
    auth::UserID,
    history::{HistoryState, get_active_years},
    timezone::get_local_date,
};

/// A route handler listing the years that hold the owner's transactions, oldest first.
///
/// An owner without any transactions gets the current year in the server's timezone,
/// so the client always has a period to show.
pub async fn get_history_periods(
    State(state): State<HistoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<i32>>, Error> {
    let years = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_active_years(user_id, &connection)?
    };

    if !years.is_empty() {
        return Ok(Json(years));
    }

    let today = get_local_date(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    Ok(Json(vec![today.year()]))
}
