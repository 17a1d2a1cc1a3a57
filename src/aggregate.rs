//! Monthly and daily roll-ups of an owner's transactions.
//!
//! The roll-ups are derived data: every write that adds or removes a transaction
//! adjusts them in the same SQL transaction, and [rebuild_aggregates] can
//! re-derive them from the transaction table at any time.
//!
//! Months are stored zero-based (January = 0) and days one-based.

use rusqlite::Connection;
use time::Date;

use crate::{Error, TransactionType, auth::UserID};

/// Create the month and day aggregate tables.
///
/// # Errors
/// Returns an error if the tables cannot be created or if there is an SQL error.
pub fn create_aggregate_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS month_aggregate (
            user_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK(month BETWEEN 0 AND 11),
            income REAL NOT NULL DEFAULT 0,
            expense REAL NOT NULL DEFAULT 0,
            transaction_count INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY(user_id, year, month)
        );

        CREATE TABLE IF NOT EXISTS day_aggregate (
            user_id INTEGER NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK(month BETWEEN 0 AND 11),
            day INTEGER NOT NULL CHECK(day BETWEEN 1 AND 31),
            income REAL NOT NULL DEFAULT 0,
            expense REAL NOT NULL DEFAULT 0,
            transaction_count INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY(user_id, year, month, day)
        );",
    )?;

    Ok(())
}

/// The change a single transaction makes to its buckets.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Delta {
    income: f64,
    expense: f64,
    transaction_count: i64,
}

impl Delta {
    fn of(transaction_type: TransactionType, amount: f64) -> Self {
        match transaction_type {
            TransactionType::Income => Self {
                income: amount,
                expense: 0.0,
                transaction_count: 1,
            },
            TransactionType::Expense => Self {
                income: 0.0,
                expense: amount,
                transaction_count: 1,
            },
        }
    }

    fn negate(self) -> Self {
        Self {
            income: -self.income,
            expense: -self.expense,
            transaction_count: -self.transaction_count,
        }
    }
}

/// Add a new transaction to the month and day buckets of `date`, creating them if needed.
///
/// Must be called in the same SQL transaction as the insert.
pub(crate) fn increment_aggregates(
    user_id: UserID,
    transaction_type: TransactionType,
    amount: f64,
    date: Date,
    connection: &Connection,
) -> Result<(), Error> {
    apply_delta(user_id, date, Delta::of(transaction_type, amount), connection)
}

/// Remove a deleted transaction from the month and day buckets of `date`.
///
/// Buckets left without any transactions are deleted.
/// Must be called in the same SQL transaction as the delete.
pub(crate) fn decrement_aggregates(
    user_id: UserID,
    transaction_type: TransactionType,
    amount: f64,
    date: Date,
    connection: &Connection,
) -> Result<(), Error> {
    apply_delta(
        user_id,
        date,
        Delta::of(transaction_type, amount).negate(),
        connection,
    )?;

    connection.execute(
        "DELETE FROM month_aggregate WHERE user_id = ?1 AND transaction_count <= 0",
        (user_id.as_i64(),),
    )?;
    connection.execute(
        "DELETE FROM day_aggregate WHERE user_id = ?1 AND transaction_count <= 0",
        (user_id.as_i64(),),
    )?;

    Ok(())
}

fn apply_delta(
    user_id: UserID,
    date: Date,
    delta: Delta,
    connection: &Connection,
) -> Result<(), Error> {
    let year = date.year();
    let month = month_index(date);
    let day = date.day();

    connection.execute(
        "INSERT INTO month_aggregate (user_id, year, month, income, expense, transaction_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(user_id, year, month) DO UPDATE SET
                income = income + excluded.income,
                expense = expense + excluded.expense,
                transaction_count = transaction_count + excluded.transaction_count",
        (
            user_id.as_i64(),
            year,
            month,
            delta.income,
            delta.expense,
            delta.transaction_count,
        ),
    )?;

    connection.execute(
        "INSERT INTO day_aggregate (user_id, year, month, day, income, expense, transaction_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id, year, month, day) DO UPDATE SET
                income = income + excluded.income,
                expense = expense + excluded.expense,
                transaction_count = transaction_count + excluded.transaction_count",
        (
            user_id.as_i64(),
            year,
            month,
            day,
            delta.income,
            delta.expense,
            delta.transaction_count,
        ),
    )?;

    Ok(())
}

/// The zero-based month of `date`, e.g. 0 for January.
pub(crate) fn month_index(date: Date) -> u8 {
    u8::from(date.month()) - 1
}

/// Re-derive the owner's month and day aggregates from their transactions.
///
/// Any drift between the stored aggregates and the transactions is discarded.
///
/// # Errors
/// Returns an error if there is an SQL error, in which case the aggregates are left unchanged.
pub fn rebuild_aggregates(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;
    let user_id = user_id.as_i64();

    sql_transaction.execute("DELETE FROM month_aggregate WHERE user_id = ?1", (user_id,))?;
    sql_transaction.execute("DELETE FROM day_aggregate WHERE user_id = ?1", (user_id,))?;

    sql_transaction.execute(
        "INSERT INTO month_aggregate (user_id, year, month, income, expense, transaction_count)
            SELECT
                user_id,
                CAST(strftime('%Y', date) AS INTEGER) AS year,
                CAST(strftime('%m', date) AS INTEGER) - 1 AS month,
                TOTAL(CASE WHEN type = 'income' THEN amount END),
                TOTAL(CASE WHEN type = 'expense' THEN amount END),
                COUNT(*)
            FROM \"transaction\"
            WHERE user_id = ?1
            GROUP BY year, month",
        (user_id,),
    )?;

    sql_transaction.execute(
        "INSERT INTO day_aggregate (user_id, year, month, day, income, expense, transaction_count)
            SELECT
                user_id,
                CAST(strftime('%Y', date) AS INTEGER) AS year,
                CAST(strftime('%m', date) AS INTEGER) - 1 AS month,
                CAST(strftime('%d', date) AS INTEGER) AS day,
                TOTAL(CASE WHEN type = 'income' THEN amount END),
                TOTAL(CASE WHEN type = 'expense' THEN amount END),
                COUNT(*)
            FROM \"transaction\"
            WHERE user_id = ?1
            GROUP BY year, month, day",
        (user_id,),
    )?;

    sql_transaction.commit()?;

    tracing::info!("rebuilt aggregates for user {user_id}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        TransactionType,
        aggregate::{month_index, rebuild_aggregates},
        auth::UserID,
        test_utils::{get_test_connection, insert_test_user, insert_transaction},
        transaction::delete_transaction,
    };

    type MonthRow = (i32, u8, f64, f64, i64);

    fn month_rows(user_id: UserID, connection: &Connection) -> Vec<MonthRow> {
        connection
            .prepare(
                "SELECT year, month, income, expense, transaction_count FROM month_aggregate
                WHERE user_id = ?1 ORDER BY year, month",
            )
            .unwrap()
            .query_map((user_id.as_i64(),), |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })
            .unwrap()
            .map(|row| row.unwrap())
            .collect()
    }

    fn day_row_count(user_id: UserID, connection: &Connection) -> i64 {
        connection
            .query_row(
                "SELECT COUNT(*) FROM day_aggregate WHERE user_id = ?1",
                (user_id.as_i64(),),
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn month_index_is_zero_based() {
        assert_eq!(month_index(date!(2024 - 01 - 31)), 0);
        assert_eq!(month_index(date!(2024 - 12 - 01)), 11);
    }

    #[test]
    fn inserts_increment_matching_buckets() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");

        insert_transaction(
            &connection,
            user.id,
            TransactionType::Income,
            "Salary",
            100.0,
            date!(2024 - 03 - 01),
        );
        insert_transaction(
            &connection,
            user.id,
            TransactionType::Expense,
            "Food",
            40.0,
            date!(2024 - 03 - 01),
        );
        insert_transaction(
            &connection,
            user.id,
            TransactionType::Expense,
            "Food",
            2.5,
            date!(2024 - 03 - 15),
        );

        assert_eq!(
            month_rows(user.id, &connection),
            [(2024, 2, 100.0, 42.5, 3)]
        );
        assert_eq!(day_row_count(user.id, &connection), 2);
    }

    #[test]
    fn deleting_last_transaction_removes_buckets() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        let kept = insert_transaction(
            &connection,
            user.id,
            TransactionType::Expense,
            "Food",
            10.0,
            date!(2024 - 03 - 01),
        );
        let deleted = insert_transaction(
            &connection,
            user.id,
            TransactionType::Expense,
            "Food",
            5.0,
            date!(2024 - 04 - 01),
        );

        delete_transaction(user.id, deleted.id, &connection).unwrap();

        assert_eq!(month_rows(user.id, &connection), [(2024, 2, 0.0, 10.0, 1)]);
        assert_eq!(day_row_count(user.id, &connection), 1);

        delete_transaction(user.id, kept.id, &connection).unwrap();

        assert!(month_rows(user.id, &connection).is_empty());
        assert_eq!(day_row_count(user.id, &connection), 0);
    }

    #[test]
    fn rebuild_matches_incremental_aggregates() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        for (transaction_type, amount, date) in [
            (TransactionType::Income, 100.0, date!(2023 - 12 - 31)),
            (TransactionType::Expense, 20.0, date!(2024 - 01 - 01)),
            (TransactionType::Expense, 30.0, date!(2024 - 01 - 01)),
            (TransactionType::Income, 7.0, date!(2024 - 11 - 30)),
        ] {
            insert_transaction(
                &connection,
                user.id,
                transaction_type,
                "Misc",
                amount,
                date,
            );
        }
        let incremental = month_rows(user.id, &connection);
        let incremental_days = day_row_count(user.id, &connection);

        connection
            .execute("UPDATE month_aggregate SET income = 999", ())
            .unwrap();
        rebuild_aggregates(user.id, &connection).unwrap();

        assert_eq!(month_rows(user.id, &connection), incremental);
        assert_eq!(day_row_count(user.id, &connection), incremental_days);
    }

    #[test]
    fn rebuild_only_touches_owner() {
        let connection = get_test_connection();
        let alice = insert_test_user(&connection, "alice");
        let bob = insert_test_user(&connection, "bob");
        insert_transaction(
            &connection,
            bob.id,
            TransactionType::Income,
            "Salary",
            1.0,
            date!(2024 - 01 - 01),
        );

        rebuild_aggregates(alice.id, &connection).unwrap();

        assert_eq!(month_rows(bob.id, &connection).len(), 1);
        assert!(month_rows(alice.id, &connection).is_empty());
    }
}
