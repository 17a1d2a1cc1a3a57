//! Registration route handler that creates a user and logs them in.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{PasswordHash, Username, ValidatedPassword, create_user, set_auth_cookie},
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data sent by the client to register a new user.
#[derive(Serialize, Deserialize)]
pub struct RegisterData {
    /// The name to log in with.
    pub username: String,
    /// The plain text password, checked for strength before hashing.
    pub password: String,
}

/// Handler for creating a new user via the POST method.
///
/// On success the user is logged in and returned with status 201 Created.
///
/// # Errors
///
/// Returns an error if the username is empty or taken, or the password is too weak.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Json(user_data): Json<RegisterData>,
) -> Result<Response, Error> {
    let username = Username::new(&user_data.username)?;
    let validated_password = ValidatedPassword::new(&user_data.password, &[username.as_ref()])?;
    let password_hash = PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)
        .inspect_err(|error| {
            tracing::error!("an error occurred while hashing a password: {error}")
        })?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(username, password_hash, &connection)?
    };

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    tracing::info!("registered user {} ({})", user.username, user.id);

    Ok((StatusCode::CREATED, jar, Json(user)).into_response())
}
