mod config;
mod error;
mod ledger;
mod logging;
mod models;
mod operations;

use clap::Parser;
use config::Config;
use ledger::session::Session;
use models::period::{PeriodKey, PeriodMode};
use operations::add::add_transaction_to_ledger;
use operations::browse::run_browse;
use operations::export::export_to_file;
use operations::import::import_transactions;
use operations::report::run_report;
use operations::summary::{render_breakdown, render_periods, render_totals};
use std::io;
use std::path::PathBuf;

#[derive(Debug, PartialEq)]
pub enum UserCommands {
    Add,
    Import,
    Export(Option<PathBuf>),
    Totals,
    Summary,
    Breakdown(Option<String>),
    Mode(Option<String>),
    Print,
    Browse,
    Report,
    Help,
    Exit,
    Unknown(String),
}

const HELP: &str = "\
Commands:
  add                   add a transaction
  import                import transactions from a CSV export
  export [path]         write all transactions to CSV
  totals                total income, expense and balance
  summary               income, expense and net per period
  breakdown [period]    expenses of one period (default: latest)
  mode [monthly|weekly] show or switch the period grouping
  print                 list all transactions
  browse                scrollable transaction table
  report                trend chart and expense pie
  help                  show this help
  exit                  quit (transactions are not saved)";

fn main() {
    let config = Config::parse();
    logging::init(&config.log_level);

    let mut session = Session::new(config.mode, config.week_key);
    let span = tracing::info_span!("session", id = %session.id);
    let _guard = span.enter();
    tracing::info!(mode = %session.mode, week_key = ?config.week_key, "session started");

    println!("Welcome to Dompet, your student wallet!");
    println!("Transactions are kept only while the program runs. Type 'help' for commands.");

    loop {
        println!("[{}] Please enter a command:", session.mode);

        let input = match read_user_input() {
            Ok(Some(cmd)) => cmd,
            Ok(None) => break,
            Err(e) => {
                println!("Error reading input: {}", e);
                continue;
            }
        };
        if input.is_empty() {
            continue;
        }

        match check_for_command(&input) {
            UserCommands::Add => {
                println!("Please enter transaction details in the format:\ndate(YYYY-MM-DD, empty for today), type(income/expense), description, amount");
                let details = match read_user_input() {
                    Ok(Some(details)) => details,
                    Ok(None) => break,
                    Err(e) => {
                        println!("Error reading input: {}", e);
                        continue;
                    }
                };
                match add_transaction_to_ledger(&mut session.ledger, &details) {
                    Ok(()) => println!("Transaction added successfully!"),
                    Err(e) => {
                        println!("Error adding transaction: {}", e);
                        println!("Please try again.");
                    }
                }
            }
            UserCommands::Import => {
                println!("Please enter the CSV file path to import from:");
                let path = match read_user_input() {
                    Ok(Some(path)) => path,
                    Ok(None) => break,
                    Err(e) => {
                        println!("Error reading input: {}", e);
                        continue;
                    }
                };
                match import_transactions(&mut session.ledger, &path) {
                    Ok(count) => println!("Successfully imported {} transactions.", count),
                    Err(e) => println!("Error importing transactions: {}", e),
                }
            }
            UserCommands::Export(path) => {
                let path = path.unwrap_or_else(|| config.export_path.clone());
                match export_to_file(&session.ledger, &path) {
                    Ok(count) => println!("Exported {} transactions to {}.", count, path.display()),
                    Err(e) => println!("Error exporting transactions: {}", e),
                }
            }
            UserCommands::Totals => {
                println!("{}", render_totals(&session.ledger.totals(), &config.currency));
            }
            UserCommands::Summary => {
                if session.ledger.is_empty() {
                    println!("{}", error::Error::EmptyLedger);
                    continue;
                }
                let aggregate = session.ledger.aggregate(session.mode);
                println!("{}", render_periods(&aggregate, session.mode, &config.currency));
            }
            UserCommands::Breakdown(period) => {
                let key = match resolve_period(&session, period.as_deref()) {
                    Ok(key) => key,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                let breakdown = session.ledger.expense_breakdown(session.mode, key);
                println!("{}", render_breakdown(key, &breakdown, &config.currency));
            }
            UserCommands::Mode(mode) => match mode {
                None => println!("Current mode: {}", session.toggle_mode()),
                Some(raw) => match raw.parse::<PeriodMode>() {
                    Ok(mode) => {
                        session.set_mode(mode);
                        println!("Current mode: {}", session.mode);
                    }
                    Err(e) => println!("{}", e),
                },
            },
            UserCommands::Print => {
                if session.ledger.is_empty() {
                    println!("{}", error::Error::EmptyLedger);
                    continue;
                }
                println!("Current Transactions:");
                for transaction in session.ledger.transactions() {
                    println!(
                        "{}  {:<8} {:<30} {}",
                        transaction.date.format("%Y-%m-%d"),
                        transaction.transaction_type,
                        transaction.description,
                        operations::summary::format_money(transaction.amount, &config.currency),
                    );
                }
            }
            UserCommands::Browse => {
                if let Err(e) = run_browse(&session.ledger, session.mode, &config.currency) {
                    println!("{}", e);
                }
            }
            UserCommands::Report => match run_report(&session.ledger, session.mode, &config.currency) {
                Ok(mode) => session.set_mode(mode),
                Err(e) => println!("{}", e),
            },
            UserCommands::Help => println!("{}", HELP),
            UserCommands::Exit => {
                println!("Exiting the application.");
                break;
            }
            UserCommands::Unknown(cmd) => {
                println!("Unknown command '{}'. Type 'help' for the list of commands.", cmd);
            }
        }
    }

    tracing::info!(transactions = session.ledger.len(), "session ended");
}

/// `Ok(None)` on end of input.
fn read_user_input() -> Result<Option<String>, String> {
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .map_err(|_| "Failed to read line".to_string())?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn check_for_command(input: &str) -> UserCommands {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or("").to_lowercase();
    let argument = parts.collect::<Vec<&str>>().join(" ");
    let argument = if argument.is_empty() { None } else { Some(argument) };

    match command.as_str() {
        "add" => UserCommands::Add,
        "import" => UserCommands::Import,
        "export" => UserCommands::Export(argument.map(PathBuf::from)),
        "totals" => UserCommands::Totals,
        "summary" => UserCommands::Summary,
        "breakdown" => UserCommands::Breakdown(argument),
        "mode" => UserCommands::Mode(argument),
        "print" => UserCommands::Print,
        "browse" => UserCommands::Browse,
        "report" => UserCommands::Report,
        "help" => UserCommands::Help,
        "exit" | "quit" => UserCommands::Exit,
        other => UserCommands::Unknown(other.to_string()),
    }
}

/// The requested period, or the latest one when none is given.
fn resolve_period(session: &Session, raw: Option<&str>) -> error::Result<PeriodKey> {
    match raw {
        Some(raw) => PeriodKey::parse_for(raw, session.mode, session.ledger.week_key())
            .map_err(error::Error::Input),
        None => session
            .ledger
            .periods(session.mode)
            .last()
            .copied()
            .ok_or(error::Error::EmptyLedger),
    }
}
