use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::transaction::{Transaction, TransactionType};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

const MAX_DESCRIPTION_LEN: usize = 255;

pub fn add_transaction_to_ledger(ledger: &mut Ledger, input: &str) -> Result<()> {
    let today = Local::now().date_naive();
    let transaction = create_transaction(input, today)?;
    ledger.append(transaction)?;
    Ok(())
}

/// Parses `date, type, description, amount`. An empty date means `today`.
/// The description may itself contain commas.
pub fn create_transaction(input: &str, today: NaiveDate) -> Result<Transaction> {
    let mut head = input.splitn(3, ',');
    let date = head.next().unwrap_or("");
    let transaction_type = head.next();
    let rest = head.next();

    let (transaction_type, (description, amount)) = match (transaction_type, rest.and_then(|r| r.rsplit_once(','))) {
        (Some(t), Some(tail)) => (t, tail),
        _ => {
            let count = input.split(',').count();
            return Err(Error::Input(format!(
                "Invalid number of details provided. Expected 4 details separated by commas but got {}",
                count
            )));
        }
    };

    parse_transaction_fields(date, transaction_type, description, amount, today)
}

/// Shared by manual entry and CSV import. Only checks that the fields are
/// well formed; the entry rules are the ledger's job.
pub fn parse_transaction_fields(
    date: &str,
    transaction_type: &str,
    description: &str,
    amount: &str,
    today: NaiveDate,
) -> Result<Transaction> {
    let date = date.trim();
    let date = if date.is_empty() {
        today
    } else {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| Error::Input(format!("Invalid date '{}'. Please use YYYY-MM-DD.", date)))?
    };

    let transaction_type = TransactionType::from_str(transaction_type).map_err(Error::Input)?;

    let amount = amount.trim();
    let amount = Decimal::from_str(amount).map_err(|_| {
        Error::Input(format!(
            "Invalid amount format '{}'. Please provide a valid decimal number.",
            amount
        ))
    })?;

    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::Input("Description too long".to_string()));
    }

    Ok(Transaction::new(date, transaction_type, description, amount))
}
