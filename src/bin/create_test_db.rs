use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use budget_tracker::{
    CategoryName, Currency, NewCategory, NewTransaction, PasswordHash, TransactionType, Username,
    ValidatedPassword, create_category, create_transaction, create_user, initialize_db,
    rebuild_aggregates, save_user_settings,
};

/// A utility for creating a test database for the budget tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const CATEGORIES: [(&str, &str, TransactionType); 6] = [
    ("Salary", "💼", TransactionType::Income),
    ("Side Hustle", "🛠️", TransactionType::Income),
    ("Groceries", "🛒", TransactionType::Expense),
    ("Rent", "🏠", TransactionType::Expense),
    ("Transport", "🚌", TransactionType::Expense),
    ("Eating Out", "🍜", TransactionType::Expense),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(Username::new_unchecked("test"), password_hash, &conn)?;
    save_user_settings(user.id, Currency::Usd, &conn)?;

    println!("Creating categories...");

    for (name, icon, transaction_type) in CATEGORIES {
        create_category(
            user.id,
            NewCategory {
                name: CategoryName::new_unchecked(name),
                icon: icon.to_owned(),
                transaction_type,
            },
            &conn,
        )?;
    }

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;

    for days_ago in 0..365 {
        let date = today - Duration::days(days_ago);
        let day = date.day();
        // A deterministic spread of amounts so that the charts have some shape.
        let wobble = f64::from(date.ordinal() % 17);

        let mut entries = Vec::new();

        match day {
            1 => {
                entries.push(("Salary", TransactionType::Income, 3200.0, "Monthly pay"));
                entries.push(("Rent", TransactionType::Expense, 1450.0, "Rent"));
            }
            15 => entries.push((
                "Side Hustle",
                TransactionType::Income,
                150.0 + wobble * 10.0,
                "Freelance work",
            )),
            _ => {}
        }

        if date.weekday().number_days_from_monday() == 5 {
            entries.push((
                "Groceries",
                TransactionType::Expense,
                80.0 + wobble * 3.5,
                "Weekly shop",
            ));
        }

        if day % 3 == 0 {
            entries.push(("Transport", TransactionType::Expense, 4.5, "Bus fare"));
        }

        if day % 7 == 2 {
            entries.push((
                "Eating Out",
                TransactionType::Expense,
                18.0 + wobble,
                "Dinner",
            ));
        }

        for (category, transaction_type, amount, description) in entries {
            create_transaction(
                user.id,
                NewTransaction {
                    amount,
                    description: description.to_owned(),
                    date,
                    category: category.to_owned(),
                    transaction_type,
                },
                &conn,
            )?;
            count += 1;
        }
    }

    rebuild_aggregates(user.id, &conn)?;

    println!("Created {count} transactions.");
    println!("Success! Log in with the username \"test\" and the password \"test\".");

    Ok(())
}
