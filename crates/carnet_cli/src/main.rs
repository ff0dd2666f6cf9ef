//! Command-line front end for Carnet.
//!
//! Every command opens the document database, subscribes the stores it
//! needs, applies one mutation through the forms and stores, then prints
//! the refreshed cache.

use anyhow::{bail, Context, Result};
use carnet_core::form::schemas::{AMOUNT, CATEGORY, DATE, DESCRIPTION, TAX_APPLICABLE, TEXT};
use carnet_core::remote::CollectionStore;
use carnet_core::store::Entity;
use carnet_core::{
    expense_form, income_form, init_logging, task_form, AppConfig, EntityStore, ExpenseStore,
    IncomeStore, RawForm, SqliteCollectionStore, TaskStore,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::rc::Rc;
use uuid::Uuid;

/// carnet: todo list and expense/income notebook
#[derive(Parser)]
#[command(name = "carnet")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Database file (overrides the configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the todo list
    Tasks {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Manage expenses
    Expenses {
        #[command(subcommand)]
        action: ExpenseAction,
    },

    /// Manage incomes
    Incomes {
        #[command(subcommand)]
        action: IncomeAction,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Add a task
    Add {
        /// Task text
        text: String,
    },

    /// Flip completion of a task
    Toggle { id: Uuid },

    /// Rewrite a task
    Edit {
        id: Uuid,

        /// New task text
        text: String,

        /// Mark the task as done
        #[arg(long)]
        done: bool,
    },

    /// Delete a task
    Remove { id: Uuid },

    /// List tasks with progress
    List,
}

#[derive(Subcommand)]
enum ExpenseAction {
    /// Add an expense
    Add {
        /// Tax-inclusive amount, `12.50` or `12,50`
        #[arg(short, long)]
        amount: String,

        #[arg(short, long)]
        description: String,

        /// Alimentation, Gestion, Véhicule or Salaire
        #[arg(short, long)]
        category: String,

        /// Day of the expense, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// VAT applies to this expense
        #[arg(long)]
        tax: bool,
    },

    /// Delete an expense
    Remove { id: Uuid },

    /// List expenses
    List,

    /// Show tax-exclusive, VAT and tax-inclusive totals
    Totals,
}

#[derive(Subcommand)]
enum IncomeAction {
    /// Add an income
    Add {
        #[arg(short, long)]
        amount: String,

        #[arg(short, long)]
        description: String,

        #[arg(short, long)]
        category: String,
    },

    /// Delete an income
    Remove { id: Uuid },

    /// List incomes with their total
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(logging) = config.logging()? {
        if let Err(err) = init_logging(&logging) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let remote = Rc::new(
        SqliteCollectionStore::open(&config.db_path)
            .with_context(|| format!("Failed to open {}", config.db_path.display()))?,
    );
    info!(
        "event=cli_start module=cli status=ok db={}",
        config.db_path.display()
    );

    match cli.command {
        Commands::Tasks { action } => run_tasks(Rc::clone(&remote), action),
        Commands::Expenses { action } => run_expenses(Rc::clone(&remote), action),
        Commands::Incomes { action } => run_incomes(Rc::clone(&remote), action),
    }
}

/// Subscribes a store and applies the initial snapshot.
fn connect<E, S>(remote: S) -> Result<EntityStore<E, S>>
where
    E: Entity,
    S: CollectionStore,
{
    let mut store = EntityStore::new(remote);
    // The stream lives as long as the store; the process exits right after.
    let _subscription = store.subscribe()?;
    store.poll_snapshots();
    if let Some(message) = store.error() {
        bail!("{message}");
    }
    Ok(store)
}

fn run_tasks(remote: Rc<SqliteCollectionStore>, action: TaskAction) -> Result<()> {
    let mut store: TaskStore<_> = connect(remote)?;

    match action {
        TaskAction::Add { text } => {
            let task = task_form(&RawForm::new().with(TEXT, text))?;
            let id = store.add(&task)?;
            println!("Added task {id}");
        }
        TaskAction::Toggle { id } => {
            let done = store.toggle(id)?;
            println!("Task {id} is now {}", if done { "done" } else { "open" });
        }
        TaskAction::Edit { id, text, done } => {
            let task = task_form(&RawForm::new().with(TEXT, text))?;
            store.set_task(id, task.text, done)?;
            println!("Updated task {id}");
        }
        TaskAction::Remove { id } => {
            store.remove(id)?;
            println!("Removed task {id}");
        }
        TaskAction::List => {}
    }

    store.poll_snapshots();
    for task in store.items() {
        println!(
            "[{}] {} {} ({})",
            if task.done { "x" } else { " " },
            task.id,
            task.text,
            task.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!(
        "{}/{} done ({:.0}%)",
        store.completed_count(),
        store.len(),
        store.progress_percent()
    );
    Ok(())
}

fn run_expenses(remote: Rc<SqliteCollectionStore>, action: ExpenseAction) -> Result<()> {
    let mut store: ExpenseStore<_> = connect(remote)?;

    match action {
        ExpenseAction::Add {
            amount,
            description,
            category,
            date,
            tax,
        } => {
            let raw = RawForm::new()
                .with(AMOUNT, amount)
                .with(DESCRIPTION, description)
                .with(CATEGORY, category)
                .with(DATE, date)
                .with(TAX_APPLICABLE, tax.to_string());
            let input = expense_form(&raw, Utc::now().date_naive())?;
            let id = store.add(&input)?;
            println!("Added expense {id}");
        }
        ExpenseAction::Remove { id } => {
            store.remove(id)?;
            println!("Removed expense {id}");
        }
        ExpenseAction::List => {
            store.poll_snapshots();
            for expense in store.items() {
                println!(
                    "{} {} {:>10} {} {}{}",
                    expense.id,
                    expense.spent_on,
                    expense.amount.round_dp(2),
                    expense.category,
                    expense.description,
                    if expense.tax_applicable { " (TVA)" } else { "" }
                );
            }
            return Ok(());
        }
        ExpenseAction::Totals => {}
    }

    store.poll_snapshots();
    println!("Total HT:  {}", store.total_tax_exclusive().round_dp(2));
    println!("TVA:       {}", store.total_tax().round_dp(2));
    println!("Total TTC: {}", store.total_tax_inclusive().round_dp(2));
    Ok(())
}

fn run_incomes(remote: Rc<SqliteCollectionStore>, action: IncomeAction) -> Result<()> {
    let mut store: IncomeStore<_> = connect(remote)?;

    match action {
        IncomeAction::Add {
            amount,
            description,
            category,
        } => {
            let raw = RawForm::new()
                .with(AMOUNT, amount)
                .with(DESCRIPTION, description)
                .with(CATEGORY, category);
            let id = store.add(&income_form(&raw)?)?;
            println!("Added income {id}");
        }
        IncomeAction::Remove { id } => {
            store.remove(id)?;
            println!("Removed income {id}");
        }
        IncomeAction::List => {}
    }

    store.poll_snapshots();
    for income in store.items() {
        println!(
            "{} {:>10} {} {}",
            income.id,
            income.amount.round_dp(2),
            income.category,
            income.description
        );
    }
    println!("Total: {}", store.total().round_dp(2));
    Ok(())
}
