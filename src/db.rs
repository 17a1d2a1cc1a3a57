//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, aggregate::create_aggregate_tables, auth::create_user_table,
    category::create_category_table, transaction::create_transaction_table,
    user_settings::create_user_settings_table,
};

/// Create all of the tables for the application's domain models.
///
/// Tables are created with `IF NOT EXISTS`, so this is safe to call on an existing database.
///
/// # Errors
/// Returns an error if a table could not be created, in which case no tables are created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_user_settings_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_aggregate_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}
