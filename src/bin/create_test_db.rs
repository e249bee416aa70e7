use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use piggybank_rs::{
    PasswordHash, ValidatedPassword, create_user,
    goal::{NewGoal, create_goal},
    initialize_db,
    transaction::{TransactionKind, TransactionRequest, create_transaction},
};

/// A utility for creating a test database for the REST API server of piggybank_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

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
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let now = OffsetDateTime::now_utc();
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        "Test User",
        "test@example.com",
        password_hash,
        now - Duration::days(90),
        &conn,
    )?;

    println!("Creating goals and transactions...");

    let goals = [
        ("Emergency fund", Decimal::new(5000, 0), Duration::days(365)),
        ("New laptop", Decimal::new(1800, 0), Duration::days(60)),
        ("Concert tickets", Decimal::new(250, 0), Duration::days(14)),
    ];

    for (index, (title, target_amount, time_left)) in goals.into_iter().enumerate() {
        let created_at = now - Duration::days(80 - 10 * index as i64);
        let goal = create_goal(
            user.id,
            NewGoal {
                title: title.to_owned(),
                target_amount,
                deadline: now + time_left,
            },
            created_at,
            &conn,
        )?;

        for week in 1..=8 {
            let (kind, amount, description) = if week % 4 == 0 {
                (TransactionKind::Withdrawal, Decimal::new(1550, 2), "Dipped in")
            } else {
                (TransactionKind::Deposit, Decimal::new(4250, 2), "Weekly savings")
            };

            create_transaction(
                user.id,
                goal.id,
                TransactionRequest {
                    amount,
                    kind,
                    description: Some(description.to_owned()),
                },
                created_at + Duration::weeks(week),
                &mut conn,
            )?;
        }
    }

    println!("Success! Log in with test@example.com and the password 'test'.");

    Ok(())
}
