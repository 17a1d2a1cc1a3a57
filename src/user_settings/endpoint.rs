//! Route handlers for reading and choosing user settings.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    currency::{CURRENCIES, Currency, CurrencyOption},
    user_settings::{UserSettings, get_or_create_user_settings, save_user_settings},
};

/// The state needed for the user settings endpoints.
#[derive(Debug, Clone)]
pub struct UserSettingsState {
    /// The database connection for managing user settings.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserSettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for choosing settings.
#[derive(Debug, Deserialize)]
pub struct UserSettingsData {
    /// A supported currency code, e.g. "EUR".
    pub currency: String,
}

/// A route handler that returns the owner's settings.
///
/// The default settings are stored on the first request so that a freshly
/// registered owner is onboarded by simply opening the app.
pub async fn get_user_settings_endpoint(
    State(state): State<UserSettingsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<UserSettings>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_or_create_user_settings(user_id, &connection).map(Json)
}

/// A route handler that stores the owner's chosen currency.
pub async fn put_user_settings_endpoint(
    State(state): State<UserSettingsState>,
    Extension(user_id): Extension<UserID>,
    Json(data): Json<UserSettingsData>,
) -> Result<Json<UserSettings>, Error> {
    let currency: Currency = data.currency.parse()?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let settings = save_user_settings(user_id, currency, &connection)?;
    tracing::debug!("user {user_id} chose currency {currency}");

    Ok(Json(settings))
}

/// A route handler that lists the supported currencies.
pub async fn get_currencies() -> Json<Vec<CurrencyOption>> {
    Json(CURRENCIES.into_iter().map(CurrencyOption::from).collect())
}
