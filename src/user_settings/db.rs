//! Storage for user settings.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::UserID,
    currency::{Currency, DEFAULT_CURRENCY},
};

/// How an owner wants their data displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// The owner of the settings.
    pub user_id: UserID,
    /// The currency amounts are formatted in.
    pub currency: Currency,
}

/// Create the user settings table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_settings (
                user_id INTEGER PRIMARY KEY,
                currency TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Get the settings for `user_id`, or `None` if the owner has not been onboarded.
pub fn get_user_settings(
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<UserSettings>, Error> {
    connection
        .prepare("SELECT user_id, currency FROM user_settings WHERE user_id = ?1")?
        .query_row((user_id.as_i64(),), map_row)
        .optional()
        .map_err(Error::from)
}

/// Get the settings for `user_id`.
///
/// # Errors
///
/// Returns [Error::MissingUserSettings] if the owner has not chosen their settings yet.
pub fn require_user_settings(
    user_id: UserID,
    connection: &Connection,
) -> Result<UserSettings, Error> {
    get_user_settings(user_id, connection)?.ok_or(Error::MissingUserSettings)
}

/// Get the settings for `user_id`, storing the defaults first if there are none.
pub fn get_or_create_user_settings(
    user_id: UserID,
    connection: &Connection,
) -> Result<UserSettings, Error> {
    connection.execute(
        "INSERT OR IGNORE INTO user_settings (user_id, currency) VALUES (?1, ?2)",
        (user_id.as_i64(), DEFAULT_CURRENCY),
    )?;

    require_user_settings(user_id, connection)
}

/// Store `currency` as the preferred currency for `user_id`, replacing any previous choice.
pub fn save_user_settings(
    user_id: UserID,
    currency: Currency,
    connection: &Connection,
) -> Result<UserSettings, Error> {
    connection.execute(
        "INSERT INTO user_settings (user_id, currency) VALUES (?1, ?2)
            ON CONFLICT(user_id) DO UPDATE SET currency = excluded.currency",
        (user_id.as_i64(), currency),
    )?;

    Ok(UserSettings { user_id, currency })
}

fn map_row(row: &Row) -> Result<UserSettings, rusqlite::Error> {
    Ok(UserSettings {
        user_id: UserID::new(row.get(0)?),
        currency: row.get(1)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        Currency, Error,
        test_utils::{get_test_connection, insert_test_user},
        user_settings::{
            UserSettings, get_or_create_user_settings, get_user_settings, require_user_settings,
            save_user_settings,
        },
    };

    #[test]
    fn missing_settings_are_none() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");

        assert_eq!(get_user_settings(user.id, &connection), Ok(None));
        assert_eq!(
            require_user_settings(user.id, &connection),
            Err(Error::MissingUserSettings)
        );
    }

    #[test]
    fn first_read_creates_default_settings() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");

        let settings = get_or_create_user_settings(user.id, &connection).unwrap();

        assert_eq!(settings.currency, Currency::Usd);
        assert_eq!(get_user_settings(user.id, &connection), Ok(Some(settings)));
    }

    #[test]
    fn save_replaces_currency() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        save_user_settings(user.id, Currency::Eur, &connection).unwrap();

        save_user_settings(user.id, Currency::Jpy, &connection).unwrap();

        assert_eq!(
            require_user_settings(user.id, &connection),
            Ok(UserSettings {
                user_id: user.id,
                currency: Currency::Jpy
            })
        );
    }

    #[test]
    fn first_read_keeps_existing_choice() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        save_user_settings(user.id, Currency::Idr, &connection).unwrap();

        let settings = get_or_create_user_settings(user.id, &connection).unwrap();

        assert_eq!(settings.currency, Currency::Idr);
    }
}
