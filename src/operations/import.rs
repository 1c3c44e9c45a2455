use super::add::parse_transaction_fields;
use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::transaction::Transaction;
use chrono::Local;
use std::fs::File;
use std::io::Read;

/// Imports a file in the export format. Every row is checked before any is
/// appended, so a bad row leaves the ledger untouched.
pub fn import_transactions(ledger: &mut Ledger, path: &str) -> Result<usize> {
    let file = File::open(path)
        .map_err(|e| Error::Input(format!("Failed to open file '{}': {}", path, e)))?;
    let count = import_csv(ledger, file)?;
    tracing::info!(path, rows = count, "imported transactions");
    Ok(count)
}

pub fn import_csv(ledger: &mut Ledger, reader: impl Read) -> Result<usize> {
    let today = Local::now().date_naive();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut staged: Vec<Transaction> = Vec::new();

    for (index, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        let record = result
            .map_err(|e| Error::Input(format!("CSV parse error on line {}: {}", line, e)))?;

        if record.len() != 4 {
            return Err(Error::Input(format!(
                "Invalid number of columns on line {}: expected 4, got {}",
                line,
                record.len()
            )));
        }

        let date = record.get(0).unwrap_or("");
        if date.is_empty() {
            return Err(Error::Input(format!("Line {}: missing date", line)));
        }
        let kind = record.get(1).unwrap_or("");
        let description = record.get(2).unwrap_or("");
        let amount = record.get(3).unwrap_or("");

        let transaction = parse_transaction_fields(date, kind, description, amount, today)
            .map_err(|e| Error::Input(format!("Line {}: {}", line, e)))?;
        Ledger::validate(&transaction).map_err(|source| Error::ImportRow { line, source })?;

        staged.push(transaction);
    }

    let count = staged.len();
    for transaction in staged {
        ledger.append(transaction)?;
    }
    Ok(count)
}
