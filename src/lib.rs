//! Budget tracker is a web service for recording income and expenses and
//! summarising them into period statistics.
//!
//! This library provides a JSON API: owners record transactions tagged with
//! categories, and the stats endpoints aggregate them into balance totals,
//! category breakdowns and dense daily/monthly history series.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod aggregate;
mod app_state;
mod auth;
mod category;
mod currency;
mod database_id;
mod db;
pub mod endpoints;
mod history;
mod logging;
mod routing;
mod stats;
mod timezone;
mod transaction;
mod transaction_type;
mod user_settings;

#[cfg(test)]
mod test_utils;

pub use aggregate::rebuild_aggregates;
pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, Username, ValidatedPassword, create_user, get_user_by_id,
};
pub use category::{Category, CategoryName, NewCategory, create_category};
pub use currency::{Currency, CurrencyFormatter};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, create_transaction};
pub use transaction_type::TransactionType;
pub use user_settings::{UserSettings, save_user_settings};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username or password did not match a registered user.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// The request did not carry a valid, unexpired auth token.
    #[error("you must be logged in to access this resource")]
    Unauthenticated,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty string was used as a username.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The username is already taken by another user.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// A query parameter was missing, malformed or out of range.
    ///
    /// The string is the message shown to the client.
    #[error("{0}")]
    InvalidQuery(String),

    /// The start of a date range came after its end.
    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange {
        /// The start of the requested range.
        from: Date,
        /// The end of the requested range.
        to: Date,
    },

    /// A transaction amount was negative, not a number or above the largest
    /// amount a transaction can record.
    #[error("amount must be between 0 and 1000000000000, got {0}")]
    InvalidAmount(f64),

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A category with the same name and type already exists for the owner.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// The category named by a new transaction does not exist for the owner
    /// with the transaction's type.
    #[error("there is no {1} category named \"{0}\"")]
    InvalidCategory(String, String),

    /// The currency code is not one of the supported currencies.
    #[error("unsupported currency \"{0}\"")]
    UnsupportedCurrency(String),

    /// The owner has not chosen their settings (e.g., currency) yet.
    #[error("user settings not found, choose a currency first")]
    MissingUserSettings,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a category that does not exist.
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// A currency formatter could not be created.
    #[error("could not create a formatter for {0}")]
    CurrencyFormatError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The auth cookie could not be created or updated.
    #[error("could not set the auth cookie: {0}")]
    AuthCookieError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_)
            | Error::EmptyUsername
            | Error::InvalidQuery(_)
            | Error::InvalidDateRange { .. }
            | Error::InvalidAmount(_)
            | Error::EmptyCategoryName
            | Error::InvalidCategory(_, _)
            | Error::UnsupportedCurrency(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateUsername(_) | Error::DuplicateCategory(_) => StatusCode::CONFLICT,
            Error::MissingUserSettings => StatusCode::PRECONDITION_REQUIRED,
            Error::NotFound | Error::DeleteMissingTransaction | Error::DeleteMissingCategory => {
                StatusCode::NOT_FOUND
            }
            Error::HashingError(_)
            | Error::CurrencyFormatError(_)
            | Error::SqlError(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError
            | Error::AuthCookieError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            Error::MissingUserSettings => json!({
                "error": Error::MissingUserSettings.to_string(),
                "settings_url": endpoints::USER_SETTINGS,
            }),
            // Server side errors are not intended to be shown to the client.
            error if status.is_server_error() => {
                tracing::error!("An unexpected error occurred: {}", error);
                json!({
                    "error": "An unexpected error occurred, check the server logs for more details."
                })
            }
            error => json!({ "error": error.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
