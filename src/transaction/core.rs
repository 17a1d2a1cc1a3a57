//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error, TransactionType,
    aggregate::{decrement_aggregates, increment_aggregates},
    auth::UserID,
    category::get_category_by_name,
    database_id::TransactionId,
    stats::DateRange,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The category name and icon are copied from the category when the transaction
/// is created, so the transaction keeps them if the category is later deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The owner of the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned, always non-negative.
    pub amount: f64,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The name of the category the transaction was labelled with.
    pub category: String,
    /// The icon of the category the transaction was labelled with.
    pub category_icon: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The data for recording a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The amount of money spent or earned, must be non-negative.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// The name of one of the owner's categories with the same type.
    pub category: String,
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
}

/// The largest amount a single transaction can record.
///
/// Keeps the per-period sums finite.
pub const MAX_AMOUNT: f64 = 1e12;

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction for `user_id` and add it to the owner's aggregates.
///
/// The insert and the aggregate update happen in a single SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative, not a finite number or above [MAX_AMOUNT],
/// - or [Error::InvalidCategory] if the owner has no category with the given name and type,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !(0.0..=MAX_AMOUNT).contains(&new_transaction.amount) {
        return Err(Error::InvalidAmount(new_transaction.amount));
    }

    let sql_transaction = connection.unchecked_transaction()?;

    let category = match get_category_by_name(
        user_id,
        new_transaction.category.trim(),
        new_transaction.transaction_type,
        &sql_transaction,
    ) {
        Ok(category) => category,
        Err(Error::NotFound) => {
            return Err(Error::InvalidCategory(
                new_transaction.category,
                new_transaction.transaction_type.to_string(),
            ));
        }
        Err(error) => return Err(error),
    };

    let transaction = sql_transaction
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, amount, type, category, category_icon, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, user_id, amount, type, category, category_icon, description, date, created_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                new_transaction.amount,
                new_transaction.transaction_type,
                category.name.as_ref(),
                &category.icon,
                &new_transaction.description,
                new_transaction.date,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    increment_aggregates(
        user_id,
        transaction.transaction_type,
        transaction.amount,
        transaction.date,
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Retrieve one of the owner's transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, amount, type, category, category_icon, description, date, created_at
             FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        )?
        .query_one((id, user_id.as_i64()), map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve the owner's transactions dated within `date_range`, oldest first.
///
/// Transactions on the same date are returned in the order they were recorded.
pub fn get_transactions_in_range(
    user_id: UserID,
    date_range: DateRange,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, type, category, category_icon, description, date, created_at
             FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date ASC, id ASC",
        )?
        .query_map(
            (user_id.as_i64(), date_range.from(), date_range.to()),
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Delete one of the owner's transactions and remove it from the owner's aggregates.
///
/// The delete and the aggregate update happen in a single SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let transaction = match get_transaction(user_id, id, &sql_transaction) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::DeleteMissingTransaction),
        Err(error) => return Err(error),
    };

    sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    decrement_aggregates(
        user_id,
        transaction.transaction_type,
        transaction.amount,
        transaction.date,
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK(amount >= 0),
                type TEXT NOT NULL CHECK(type IN ('income', 'expense')),
                category TEXT NOT NULL,
                category_icon TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Add composite index used by the stats queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        transaction_type: row.get(3)?,
        category: row.get(4)?,
        category_icon: row.get(5)?,
        description: row.get(6)?,
        date: row.get(7)?,
        created_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error, TransactionType,
        category::{CategoryName, NewCategory, create_category, delete_category},
        history::{HistoryPlan, build_history},
        stats::{DateRange, get_balance_totals},
        test_utils::{get_test_connection, insert_test_user, insert_transaction},
        transaction::{
            MAX_AMOUNT, NewTransaction, create_transaction, delete_transaction, get_transaction,
            get_transactions_in_range,
        },
    };

    fn new_transaction(amount: f64, category: &str) -> NewTransaction {
        NewTransaction {
            amount,
            description: "Weekly shop".to_owned(),
            date: date!(2024 - 05 - 04),
            category: category.to_owned(),
            transaction_type: TransactionType::Expense,
        }
    }

    #[test]
    fn create_copies_category_icon() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        create_category(
            user.id,
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                icon: "🛒".to_owned(),
                transaction_type: TransactionType::Expense,
            },
            &connection,
        )
        .unwrap();

        let transaction =
            create_transaction(user.id, new_transaction(12.3, "Groceries"), &connection).unwrap();

        assert!(transaction.id > 0);
        assert_eq!(transaction.category_icon, "🛒");
        assert_eq!(transaction.amount, 12.3);
        assert_eq!(
            get_transaction(user.id, transaction.id, &connection).map(|t| t.category_icon),
            Ok("🛒".to_owned())
        );
    }

    #[test]
    fn create_fails_on_negative_amount() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");

        let result = create_transaction(user.id, new_transaction(-1.0, "Groceries"), &connection);

        assert_eq!(result, Err(Error::InvalidAmount(-1.0)));
    }

    #[test]
    fn create_fails_on_amount_above_max() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");

        for amount in [MAX_AMOUNT * 10.0, 1e308, f64::INFINITY] {
            let result =
                create_transaction(user.id, new_transaction(amount, "Groceries"), &connection);

            assert_eq!(result, Err(Error::InvalidAmount(amount)));
        }
    }

    #[test]
    fn huge_amounts_cannot_make_totals_infinite() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        insert_transaction(
            &connection,
            user.id,
            TransactionType::Income,
            "Salary",
            MAX_AMOUNT,
            date!(2024 - 03 - 01),
        );
        let result = create_transaction(
            user.id,
            NewTransaction {
                amount: 1e308,
                description: String::new(),
                date: date!(2024 - 03 - 02),
                category: "Salary".to_owned(),
                transaction_type: TransactionType::Income,
            },
            &connection,
        );
        assert_eq!(result, Err(Error::InvalidAmount(1e308)));

        let range = DateRange::new(date!(2024 - 03 - 01), date!(2024 - 03 - 31)).unwrap();
        let totals = get_balance_totals(user.id, range, &connection).unwrap();
        assert_eq!(totals.income, MAX_AMOUNT);
        assert_eq!(
            serde_json::to_value(totals).unwrap()["income"],
            serde_json::json!(MAX_AMOUNT)
        );

        let history =
            build_history(user.id, HistoryPlan::Yearly { year: 2024 }, &connection).unwrap();
        assert_eq!(history[2].income, MAX_AMOUNT);
    }

    #[test]
    fn create_fails_on_category_of_other_type() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        create_category(
            user.id,
            NewCategory {
                name: CategoryName::new_unchecked("Salary"),
                icon: "💼".to_owned(),
                transaction_type: TransactionType::Income,
            },
            &connection,
        )
        .unwrap();

        let result = create_transaction(user.id, new_transaction(10.0, "Salary"), &connection);

        assert_eq!(
            result,
            Err(Error::InvalidCategory(
                "Salary".to_owned(),
                "expense".to_owned()
            ))
        );
    }

    #[test]
    fn create_fails_on_other_owners_category() {
        let connection = get_test_connection();
        let alice = insert_test_user(&connection, "alice");
        let bob = insert_test_user(&connection, "bob");
        insert_transaction(
            &connection,
            bob.id,
            TransactionType::Expense,
            "Groceries",
            1.0,
            date!(2024 - 05 - 04),
        );

        let result = create_transaction(alice.id, new_transaction(10.0, "Groceries"), &connection);

        assert!(matches!(result, Err(Error::InvalidCategory(_, _))));
    }

    #[test]
    fn transaction_survives_category_deletion() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        let category = create_category(
            user.id,
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                icon: "🛒".to_owned(),
                transaction_type: TransactionType::Expense,
            },
            &connection,
        )
        .unwrap();
        let transaction =
            create_transaction(user.id, new_transaction(12.3, "Groceries"), &connection).unwrap();

        delete_category(user.id, category.id, &connection).unwrap();

        let got = get_transaction(user.id, transaction.id, &connection).unwrap();
        assert_eq!(got.category, "Groceries");
        assert_eq!(got.category_icon, "🛒");
    }

    #[test]
    fn get_transactions_in_range_is_inclusive_and_ordered() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        let insert = |amount, date| {
            insert_transaction(
                &connection,
                user.id,
                TransactionType::Expense,
                "Food",
                amount,
                date,
            )
        };
        insert(3.0, date!(2024 - 01 - 31));
        insert(1.0, date!(2024 - 01 - 01));
        insert(2.0, date!(2024 - 01 - 01));
        insert(4.0, date!(2024 - 02 - 01));
        insert(0.5, date!(2023 - 12 - 31));

        let range = DateRange::new(date!(2024 - 01 - 01), date!(2024 - 01 - 31)).unwrap();
        let amounts: Vec<f64> = get_transactions_in_range(user.id, range, &connection)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.amount)
            .collect();

        assert_eq!(amounts, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn delete_is_owner_scoped() {
        let connection = get_test_connection();
        let alice = insert_test_user(&connection, "alice");
        let bob = insert_test_user(&connection, "bob");
        let transaction = insert_transaction(
            &connection,
            alice.id,
            TransactionType::Expense,
            "Food",
            1.0,
            date!(2024 - 01 - 01),
        );

        assert_eq!(
            delete_transaction(bob.id, transaction.id, &connection),
            Err(Error::DeleteMissingTransaction)
        );
        assert_eq!(delete_transaction(alice.id, transaction.id, &connection), Ok(()));
        assert_eq!(
            get_transaction(alice.id, transaction.id, &connection),
            Err(Error::NotFound)
        );
    }
}
