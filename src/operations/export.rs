use crate::error::Result;
use crate::ledger::Ledger;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const HEADER: [&str; 4] = ["Date", "Kind", "Description", "Amount"];

/// Writes every transaction, in insertion order, as one CSV row under a
/// `Date,Kind,Description,Amount` header. Returns the number of rows.
pub fn export_csv(ledger: &Ledger, writer: impl Write) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(HEADER)?;

    for transaction in ledger.transactions() {
        writer.write_record([
            transaction.date.format("%Y-%m-%d").to_string(),
            transaction.transaction_type.label().to_string(),
            transaction.description.clone(),
            transaction.amount.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(ledger.len())
}

pub fn export_to_file(ledger: &Ledger, path: &Path) -> Result<usize> {
    let file = File::create(path)?;
    let count = export_csv(ledger, file)?;
    tracing::info!(path = %path.display(), rows = count, "exported transactions");
    Ok(count)
}
