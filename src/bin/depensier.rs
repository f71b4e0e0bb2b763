//! The command line interface for dépensier.

use std::{
    error::Error,
    sync::{Arc, Mutex, OnceLock},
};

use clap::{Parser, Subcommand, ValueEnum};
use numfmt::{Formatter, Precision};
use rusqlite::Connection;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use depensier::{
    AccountId, Amount, AppState,
    account::get_or_create_account,
    budget::{self, BudgetPeriod, recompute_spending},
    goal,
    stores::{
        BudgetStore, GoalChanges, GoalStore, NewBudget, NewGoal, SQLiteBudgetStore,
        SQLiteGoalStore, SQLiteTransactionStore, SortOrder, TransactionQuery, TransactionStore,
    },
    summary::{category_spending, monthly_stats},
    transaction::{
        Transaction, TransactionChanges, TransactionKind, add_transaction, delete_transaction,
        update_transaction,
    },
};

type SqliteAppState = AppState<SQLiteTransactionStore, SQLiteBudgetStore, SQLiteGoalStore>;

/// A personal finance tracker: a transaction ledger with category budgets
/// and savings goals.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DEPENSIER_DB", default_value = "depensier.db")]
    db_path: String,

    /// The canonical timezone used to anchor "the current month", e.g.
    /// "Pacific/Auckland".
    #[arg(long, env = "DEPENSIER_TZ", default_value = "Etc/UTC")]
    timezone: String,

    /// The account to operate on, created on first use.
    #[arg(long, default_value = "default")]
    account: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Expense,
    Income,
}

impl From<KindArg> for TransactionKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Expense => TransactionKind::Expense,
            KindArg::Income => TransactionKind::Income,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PeriodArg {
    Monthly,
    Weekly,
}

impl From<PeriodArg> for BudgetPeriod {
    fn from(value: PeriodArg) -> Self {
        match value {
            PeriodArg::Monthly => BudgetPeriod::Monthly,
            PeriodArg::Weekly => BudgetPeriod::Weekly,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a transaction.
    Add {
        /// Whether money was spent or earned.
        #[arg(long, value_enum)]
        kind: KindArg,
        /// The amount of money moved, e.g. "12.50".
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
        /// The category the transaction belongs to.
        #[arg(long)]
        category: String,
        /// What the transaction was for.
        #[arg(long, default_value = "")]
        description: String,
        /// The transaction date (YYYY-MM-DD), today when omitted.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
        /// How the transaction was paid.
        #[arg(long, default_value = "card")]
        payment_method: String,
        /// A label to attach; repeat for several.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Mark the transaction as recurring.
        #[arg(long)]
        recurring: bool,
    },
    /// Edit a transaction; only the given fields change.
    Edit {
        /// The ID of the transaction to edit.
        id: i64,
        /// Replace the kind; requires --amount.
        #[arg(long, value_enum, requires = "amount")]
        kind: Option<KindArg>,
        /// Replace the amount; requires --kind.
        #[arg(long, value_parser = parse_amount, requires = "kind")]
        amount: Option<Amount>,
        /// Replace the category.
        #[arg(long)]
        category: Option<String>,
        /// Replace the description.
        #[arg(long)]
        description: Option<String>,
        /// Replace the date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
        /// Replace the payment method.
        #[arg(long)]
        payment_method: Option<String>,
    },
    /// Delete a transaction.
    Remove {
        /// The ID of the transaction to delete.
        id: i64,
    },
    /// List transactions, newest first.
    List {
        /// List the whole ledger instead of the current month.
        #[arg(long)]
        all: bool,
    },
    /// Create a budget for a category.
    SetBudget {
        /// The category to limit.
        #[arg(long)]
        category: String,
        /// The spending limit, e.g. "500".
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
        /// The cadence of the limit.
        #[arg(long, value_enum, default_value = "monthly")]
        period: PeriodArg,
        /// The display color.
        #[arg(long, default_value = "#22c55e")]
        color: String,
    },
    /// Change a budget's limit.
    EditBudget {
        /// The ID of the budget to edit.
        id: i64,
        /// The new spending limit.
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },
    /// Delete a budget.
    RemoveBudget {
        /// The ID of the budget to delete.
        id: i64,
    },
    /// Show all budgets with their current-month spending.
    Budgets,
    /// Create a savings goal.
    AddGoal {
        /// What you are saving for.
        #[arg(long)]
        title: String,
        /// The amount to save in total.
        #[arg(long, value_parser = parse_amount)]
        target: Amount,
        /// When you want to reach the target (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        deadline: Date,
        /// The display color.
        #[arg(long, default_value = "#3b82f6")]
        color: String,
    },
    /// Edit a goal; only the given fields change.
    EditGoal {
        /// The ID of the goal to edit.
        id: i64,
        /// Replace the title.
        #[arg(long)]
        title: Option<String>,
        /// Replace the target amount.
        #[arg(long, value_parser = parse_amount)]
        target: Option<Amount>,
        /// Replace the deadline (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        deadline: Option<Date>,
    },
    /// Add money to a goal, clamped at its target.
    Contribute {
        /// The ID of the goal to fund.
        id: i64,
        /// The amount to add.
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },
    /// Delete a goal.
    RemoveGoal {
        /// The ID of the goal to delete.
        id: i64,
    },
    /// Show all goals and their progress.
    Goals,
    /// Show the income/expense summary for the current month.
    Summary,
    /// Recompute every budget's spending from the ledger.
    Reconcile,
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    let connection = Connection::open(&args.db_path)?;
    let connection = Arc::new(Mutex::new(connection));

    let mut state = AppState::new(
        &args.timezone,
        connection.clone(),
        SQLiteTransactionStore::new(connection.clone()),
        SQLiteBudgetStore::new(connection.clone()),
        SQLiteGoalStore::new(connection),
    )?;

    let account = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| depensier::Error::DatabaseLock)?;
        get_or_create_account(&args.account, &connection)?.id
    };

    let today = state.today()?;
    tracing::debug!("operating on account {:?} with date {today}", account);

    run_command(args.command, &mut state, account, today)
}

fn run_command(
    command: Command,
    state: &mut SqliteAppState,
    account: AccountId,
    today: Date,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Add {
            kind,
            amount,
            category,
            description,
            date,
            payment_method,
            tags,
            recurring,
        } => {
            let builder = Transaction::build(kind.into(), amount, date.unwrap_or(today))
                .category(category)
                .description(description)
                .payment_method(payment_method)
                .tags(tags)
                .recurring(recurring);

            let transaction = add_transaction(
                &mut state.transaction_store,
                &mut state.budget_store,
                account,
                builder,
                today,
            )?;

            println!(
                "Recorded {} {} of {} in {} (#{})",
                transaction.kind.as_str(),
                transaction.date,
                format_currency(transaction.amount),
                transaction.category,
                transaction.id,
            );
        }
        Command::Edit {
            id,
            kind,
            amount,
            category,
            description,
            date,
            payment_method,
        } => {
            let changes = TransactionChanges {
                kind_and_amount: kind
                    .zip(amount)
                    .map(|(kind, amount)| (kind.into(), amount)),
                category,
                description,
                date,
                payment_method,
                ..Default::default()
            };

            let transaction = update_transaction(
                &mut state.transaction_store,
                &mut state.budget_store,
                account,
                id,
                changes,
                today,
            )?;

            println!("Updated transaction #{}", transaction.id);
        }
        Command::Remove { id } => {
            delete_transaction(
                &mut state.transaction_store,
                &mut state.budget_store,
                account,
                id,
                today,
            )?;

            println!("Deleted transaction #{id}");
        }
        Command::List { all } => {
            let query = if all {
                TransactionQuery {
                    sort_date: Some(SortOrder::Descending),
                    ..Default::default()
                }
            } else {
                let bounds = depensier::period::month_bounds(today);
                TransactionQuery {
                    date_range: Some(bounds.start..=bounds.end),
                    sort_date: Some(SortOrder::Descending),
                    ..Default::default()
                }
            };

            let transactions = state.transaction_store.get_query(account, query)?;

            if transactions.is_empty() {
                println!("No transactions.");
                return Ok(());
            }

            for transaction in transactions {
                println!(
                    "#{:<4} {} {:>10} {:<12} {}",
                    transaction.id,
                    transaction.date,
                    format_currency(transaction.signed_amount()),
                    transaction.category,
                    transaction.description,
                );
            }
        }
        Command::SetBudget {
            category,
            amount,
            period,
            color,
        } => {
            let new_budget = NewBudget {
                category,
                amount,
                period: period.into(),
                color,
            };

            let budget = budget::create_budget(
                &state.transaction_store,
                &mut state.budget_store,
                account,
                new_budget,
                today,
            )?;

            println!(
                "Budget #{} caps {} at {} per {} ({} already spent this month)",
                budget.id,
                budget.category,
                format_currency(budget.amount),
                budget.period.as_str(),
                format_currency(budget.spent),
            );
        }
        Command::EditBudget { id, amount } => {
            state.budget_store.update_amount(account, id, amount)?;

            println!("Budget #{id} limit set to {}", format_currency(amount));
        }
        Command::RemoveBudget { id } => {
            state.budget_store.delete(account, id)?;

            println!("Deleted budget #{id}");
        }
        Command::Budgets => {
            let budgets = state.budget_store.get_all(account)?;

            if budgets.is_empty() {
                println!("No budgets.");
                return Ok(());
            }

            for budget in budgets {
                println!(
                    "#{:<4} {:<12} {:>10} spent of {:>10} ({} left)",
                    budget.id,
                    budget.category,
                    format_currency(budget.spent),
                    format_currency(budget.amount),
                    format_currency(budget.remaining()),
                );
            }
        }
        Command::AddGoal {
            title,
            target,
            deadline,
            color,
        } => {
            let new_goal = NewGoal {
                title,
                target_amount: target,
                current_amount: Amount::ZERO,
                deadline,
                color,
            };

            let goal = goal::create_goal(&mut state.goal_store, account, new_goal)?;

            println!(
                "Goal #{} saves towards {} by {}",
                goal.id,
                format_currency(goal.target_amount),
                goal.deadline,
            );
        }
        Command::EditGoal {
            id,
            title,
            target,
            deadline,
        } => {
            let changes = GoalChanges {
                title,
                target_amount: target,
                deadline,
                ..Default::default()
            };

            let goal = goal::update_goal(&mut state.goal_store, account, id, changes)?;

            println!("Updated goal #{}", goal.id);
        }
        Command::Contribute { id, amount } => {
            let goal = goal::add_money_to_goal(&mut state.goal_store, account, id, amount)?;

            println!(
                "Goal \"{}\" now holds {} of {}",
                goal.title,
                format_currency(goal.current_amount),
                format_currency(goal.target_amount),
            );
        }
        Command::RemoveGoal { id } => {
            state.goal_store.delete(account, id)?;

            println!("Deleted goal #{id}");
        }
        Command::Goals => {
            let goals = state.goal_store.get_all(account)?;

            if goals.is_empty() {
                println!("No goals.");
                return Ok(());
            }

            for goal in goals {
                let marker = if goal.is_reached() { " (reached)" } else { "" };
                println!(
                    "#{:<4} {:<20} {:>10} of {:>10} by {}{}",
                    goal.id,
                    goal.title,
                    format_currency(goal.current_amount),
                    format_currency(goal.target_amount),
                    goal.deadline,
                    marker,
                );
            }
        }
        Command::Summary => {
            let transactions = state
                .transaction_store
                .get_query(account, TransactionQuery::default())?;

            let stats = monthly_stats(&transactions, today);
            let spending = category_spending(&transactions, today);

            println!("Income:       {:>12}", format_currency(stats.total_income));
            println!(
                "Expenses:     {:>12}",
                format_currency(stats.total_expenses)
            );
            println!("Net:          {:>12}", format_currency(stats.net_income));
            println!("Transactions: {:>12}", stats.transaction_count);

            if !spending.is_empty() {
                println!("\nSpending by category:");
                let mut categories: Vec<_> = spending.into_iter().collect();
                categories.sort_by(|a, b| b.1.cmp(&a.1));

                for (category, amount) in categories {
                    println!("  {:<12} {:>10}", category, format_currency(amount));
                }
            }
        }
        Command::Reconcile => {
            recompute_spending(
                &state.transaction_store,
                &mut state.budget_store,
                account,
                today,
            )?;

            println!("Budgets reconciled against the ledger.");
        }
    }

    Ok(())
}

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value, &DATE_FORMAT).map_err(|error| error.to_string())
}

/// Clap adapter for [Amount::parse]; parsing itself never fails.
#[allow(clippy::unnecessary_wraps)]
fn parse_amount(value: &str) -> Result<Amount, String> {
    Ok(Amount::parse(value))
}

/// Formats an amount as a dollar currency string, e.g. "-$1,234.50".
fn format_currency(amount: Amount) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let number = amount.to_major();

    let mut formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "$0.00".to_owned()
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    if formatted_string.as_bytes()[formatted_string.len() - 3] != b'.' {
        formatted_string = format!("{formatted_string}0");
    }

    formatted_string
}

fn setup_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
