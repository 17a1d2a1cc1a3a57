//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error, TransactionType,
    auth::UserID,
    category::{Category, CategoryName, NewCategory},
    database_id::CategoryId,
};

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            type TEXT NOT NULL CHECK(type IN ('income', 'expense')),
            UNIQUE(user_id, name, type),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_type ON category(user_id, type);",
    )?;

    Ok(())
}

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns an [Error::DuplicateCategory] if the owner already has a category
/// with the same name and type.
pub fn create_category(
    user_id: UserID,
    new_category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (user_id, name, icon, type) VALUES (?1, ?2, ?3, ?4)",
            (
                user_id.as_i64(),
                new_category.name.as_ref(),
                &new_category.icon,
                new_category.transaction_type,
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategory(new_category.name.to_string()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name: new_category.name,
        icon: new_category.icon,
        transaction_type: new_category.transaction_type,
    })
}

/// Retrieve the owner's categories ordered alphabetically by name.
///
/// Only categories of `transaction_type` are returned if it is given.
pub fn get_categories(
    user_id: UserID,
    transaction_type: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, icon, type FROM category
            WHERE user_id = ?1 AND (?2 IS NULL OR type = ?2)
            ORDER BY name ASC, type ASC",
        )?
        .query_map((user_id.as_i64(), transaction_type), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the owner's category with `name` and `transaction_type`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the owner has no such category.
pub fn get_category_by_name(
    user_id: UserID,
    name: &str,
    transaction_type: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, icon, type FROM category
            WHERE user_id = ?1 AND name = ?2 AND type = ?3",
        )?
        .query_row((user_id.as_i64(), name, transaction_type), map_row)
        .map_err(|error| error.into())
}

/// Delete the owner's category by ID.
///
/// Transactions that were labelled with the category are kept as they are.
///
/// # Errors
///
/// Returns an [Error::DeleteMissingCategory] if the category does not exist or belongs to
/// another user.
pub fn delete_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: CategoryName::new_unchecked(&raw_name),
        icon: row.get(3)?,
        transaction_type: row.get(4)?,
    })
}
