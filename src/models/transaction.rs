use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!(
                "Invalid transaction type '{}'. Use 'income' or 'expense'.",
                other
            )),
        }
    }
}

/// A single manually entered income or expense.
///
/// Once handed to the ledger a transaction is never modified; the ledger only
/// gives out shared references to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub description: String,
    pub amount: Decimal,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        transaction_type: TransactionType,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            date,
            transaction_type,
            description: description.into(),
            amount,
        }
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_parse_case_insensitive() {
        assert_eq!("Income".parse::<TransactionType>(), Ok(TransactionType::Income));
        assert_eq!(" EXPENSE ".parse::<TransactionType>(), Ok(TransactionType::Expense));
    }

    #[test]
    fn test_transaction_type_parse_invalid() {
        let err = "transfer".parse::<TransactionType>().unwrap_err();
        assert!(err.contains("Invalid transaction type"));
    }

    #[test]
    fn test_transaction_kind_helpers() {
        let tx = Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            TransactionType::Expense,
            "Food",
            Decimal::new(150000, 0),
        );
        assert!(tx.is_expense());
        assert!(!tx.is_income());
        assert_eq!(tx.transaction_type.to_string(), "Expense");
    }
}
