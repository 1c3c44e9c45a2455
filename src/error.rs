use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons the ledger refuses a transaction. Each variant names the field
/// the user has to fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("description must not be empty")]
    MissingDescription,
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Input(String),
    #[error("transaction rejected: {0}")]
    Validation(#[from] ValidationError),
    #[error("Line {line}: transaction rejected: {source}")]
    ImportRow {
        line: usize,
        source: ValidationError,
    },
    #[error("could not access file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not read or write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Terminal(String),
    #[error("no transactions yet, add some with the 'add' command")]
    EmptyLedger,
}

pub type Result<T> = std::result::Result<T, Error>;
