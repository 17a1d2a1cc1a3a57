use rusqlite::Connection;
use time::Date;

use crate::{
    Error, PasswordHash, Transaction, TransactionType, User, Username, ValidatedPassword,
    auth::UserID,
    category::{CategoryName, NewCategory, create_category},
    create_user, initialize_db,
    transaction::{NewTransaction, create_transaction},
};

/// The password given to every user created by [insert_test_user].
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize_db(&connection).expect("Could not initialize database.");
    connection
}

/// Insert a user with the password [TEST_PASSWORD].
///
/// Uses the cheapest hashing cost so that tests stay fast.
pub(crate) fn insert_test_user(connection: &Connection, username: &str) -> User {
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
        .expect("Could not hash password");

    create_user(Username::new_unchecked(username), password_hash, connection)
        .expect("Could not create test user")
}

/// Insert a transaction, creating its category first if it does not exist yet.
pub(crate) fn insert_transaction(
    connection: &Connection,
    user_id: UserID,
    transaction_type: TransactionType,
    category: &str,
    amount: f64,
    date: Date,
) -> Transaction {
    let new_category = NewCategory {
        name: CategoryName::new_unchecked(category),
        icon: "🏷️".to_owned(),
        transaction_type,
    };

    match create_category(user_id, new_category, connection) {
        Ok(_) | Err(Error::DuplicateCategory(_)) => {}
        Err(error) => panic!("Could not create category {category}: {error}"),
    }

    create_transaction(
        user_id,
        NewTransaction {
            amount,
            description: format!("{category} on {date}"),
            date,
            category: category.to_owned(),
            transaction_type,
        },
        connection,
    )
    .expect("Could not create test transaction")
}
