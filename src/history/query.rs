//! Sparse bucketed sums read from the aggregate tables.

use rusqlite::{Connection, Row};

use crate::{Error, auth::UserID, history::HistoryPlan};

/// The summed income and expense of one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BucketTotals {
    /// The total amount earned in the bucket.
    pub income: f64,
    /// The total amount spent in the bucket.
    pub expense: f64,
}

/// Get the totals of the owner's buckets in `plan` that hold at least one transaction,
/// ordered by bucket index.
///
/// The index is the zero-based month for [HistoryPlan::Yearly] and the day of the
/// month for [HistoryPlan::Monthly].
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_sparse_buckets(
    user_id: UserID,
    plan: HistoryPlan,
    connection: &Connection,
) -> Result<Vec<(u8, BucketTotals)>, Error> {
    match plan {
        HistoryPlan::Yearly { year } => connection
            .prepare(
                "SELECT month, TOTAL(income), TOTAL(expense) FROM month_aggregate
                 WHERE user_id = ?1 AND year = ?2
                 GROUP BY month
                 ORDER BY month ASC",
            )?
            .query_map((user_id.as_i64(), year), map_bucket_row)?
            .map(|maybe_bucket| maybe_bucket.map_err(Error::from))
            .collect(),
        HistoryPlan::Monthly { year, month } => connection
            .prepare(
                "SELECT day, TOTAL(income), TOTAL(expense) FROM day_aggregate
                 WHERE user_id = ?1 AND year = ?2 AND month = ?3
                 GROUP BY day
                 ORDER BY day ASC",
            )?
            .query_map((user_id.as_i64(), year, month), map_bucket_row)?
            .map(|maybe_bucket| maybe_bucket.map_err(Error::from))
            .collect(),
    }
}

fn map_bucket_row(row: &Row) -> Result<(u8, BucketTotals), rusqlite::Error> {
    Ok((
        row.get(0)?,
        BucketTotals {
            income: row.get(1)?,
            expense: row.get(2)?,
        },
    ))
}

/// Get the years in which the owner has at least one transaction, in ascending order.
pub fn get_active_years(user_id: UserID, connection: &Connection) -> Result<Vec<i32>, Error> {
    connection
        .prepare(
            "SELECT DISTINCT year FROM month_aggregate WHERE user_id = ?1 ORDER BY year ASC",
        )?
        .query_map((user_id.as_i64(),), |row| row.get(0))?
        .map(|maybe_year| maybe_year.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        TransactionType,
        history::{BucketTotals, HistoryPlan, get_active_years, get_sparse_buckets},
        test_utils::{get_test_connection, insert_test_user, insert_transaction},
    };

    #[test]
    fn yearly_buckets_are_sparse_and_ordered() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        for (transaction_type, amount, date) in [
            (TransactionType::Expense, 5.0, date!(2024 - 11 - 20)),
            (TransactionType::Income, 100.0, date!(2024 - 03 - 01)),
            (TransactionType::Expense, 40.0, date!(2024 - 03 - 31)),
            (TransactionType::Expense, 999.0, date!(2023 - 03 - 01)),
        ] {
            insert_transaction(&connection, user.id, transaction_type, "Misc", amount, date);
        }

        let buckets =
            get_sparse_buckets(user.id, HistoryPlan::Yearly { year: 2024 }, &connection).unwrap();

        assert_eq!(
            buckets,
            [
                (
                    2,
                    BucketTotals {
                        income: 100.0,
                        expense: 40.0
                    }
                ),
                (
                    10,
                    BucketTotals {
                        income: 0.0,
                        expense: 5.0
                    }
                ),
            ]
        );
    }

    #[test]
    fn monthly_buckets_are_per_day() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "alice");
        for date in [
            date!(2024 - 02 - 29),
            date!(2024 - 02 - 01),
            date!(2024 - 02 - 01),
            date!(2024 - 03 - 01),
        ] {
            insert_transaction(
                &connection,
                user.id,
                TransactionType::Expense,
                "Misc",
                1.0,
                date,
            );
        }

        let buckets = get_sparse_buckets(
            user.id,
            HistoryPlan::Monthly {
                year: 2024,
                month: 1,
            },
            &connection,
        )
        .unwrap();

        let days: Vec<(u8, f64)> = buckets
            .iter()
            .map(|(day, totals)| (*day, totals.expense))
            .collect();
        assert_eq!(days, [(1, 2.0), (29, 1.0)]);
    }

    #[test]
    fn active_years_are_distinct_and_owner_scoped() {
        let connection = get_test_connection();
        let alice = insert_test_user(&connection, "alice");
        let bob = insert_test_user(&connection, "bob");
        for date in [
            date!(2024 - 01 - 01),
            date!(2022 - 06 - 01),
            date!(2024 - 07 - 01),
        ] {
            insert_transaction(
                &connection,
                alice.id,
                TransactionType::Income,
                "Salary",
                1.0,
                date,
            );
        }
        insert_transaction(
            &connection,
            bob.id,
            TransactionType::Income,
            "Salary",
            1.0,
            date!(2030 - 01 - 01),
        );

        assert_eq!(get_active_years(alice.id, &connection), Ok(vec![2022, 2024]));
    }
}
