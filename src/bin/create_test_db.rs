use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use depensier::{
    Amount, AppState,
    account::get_or_create_account,
    budget::{BudgetPeriod, create_budget},
    goal::{add_money_to_goal, create_goal},
    stores::{NewBudget, NewGoal, SQLiteBudgetStore, SQLiteGoalStore, SQLiteTransactionStore},
    transaction::{Transaction, TransactionKind, add_transaction},
};

/// A utility for creating a dépensier database populated with sample data.
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
    let connection = Arc::new(Mutex::new(Connection::open(output_path)?));

    let mut state = AppState::new(
        "Etc/UTC",
        connection.clone(),
        SQLiteTransactionStore::new(connection.clone()),
        SQLiteBudgetStore::new(connection.clone()),
        SQLiteGoalStore::new(connection),
    )?;

    println!("Creating demo account...");

    let account = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| depensier::Error::DatabaseLock)?;
        get_or_create_account("demo", &connection)?.id
    };

    let today = state.today()?;

    println!("Creating sample budgets...");

    for (category, amount, color) in [
        ("Food", 500.0, "#22c55e"),
        ("Transport", 150.0, "#f59e0b"),
        ("Entertainment", 100.0, "#8b5cf6"),
    ] {
        create_budget(
            &state.transaction_store,
            &mut state.budget_store,
            account,
            NewBudget {
                category: category.to_owned(),
                amount: Amount::from_major(amount),
                period: BudgetPeriod::Monthly,
                color: color.to_owned(),
            },
            today,
        )?;
    }

    println!("Creating sample transactions...");

    let salary_day = OffsetDateTime::now_utc().date() - Duration::days(3);
    add_transaction(
        &mut state.transaction_store,
        &mut state.budget_store,
        account,
        Transaction::build(
            TransactionKind::Income,
            Amount::from_major(3200.0),
            salary_day,
        )
        .category("Salary")
        .description("Monthly salary")
        .payment_method("transfer"),
        today,
    )?;

    for (days_ago, amount, category, description) in [
        (2, 68.40, "Food", "Groceries"),
        (2, 12.50, "Transport", "Bus card top-up"),
        (1, 24.99, "Entertainment", "Cinema tickets"),
        (0, 9.80, "Food", "Lunch"),
    ] {
        let date = OffsetDateTime::now_utc().date() - Duration::days(days_ago);

        add_transaction(
            &mut state.transaction_store,
            &mut state.budget_store,
            account,
            Transaction::build(TransactionKind::Expense, Amount::from_major(amount), date)
                .category(category)
                .description(description)
                .payment_method("card"),
            today,
        )?;
    }

    println!("Creating sample goal...");

    let goal = create_goal(
        &mut state.goal_store,
        account,
        NewGoal {
            title: "Emergency fund".to_owned(),
            target_amount: Amount::from_major(5000.0),
            current_amount: Amount::ZERO,
            deadline: OffsetDateTime::now_utc().date() + Duration::days(365),
            color: "#3b82f6".to_owned(),
        },
    )?;
    add_money_to_goal(
        &mut state.goal_store,
        account,
        goal.id,
        Amount::from_major(750.0),
    )?;

    println!("Success!");

    Ok(())
}
