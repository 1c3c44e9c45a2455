use crate::models::transaction::{Transaction, TransactionType};
use rust_decimal::Decimal;

/// Income, expense and their difference over some set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net: Decimal,
}

impl Totals {
    pub fn record(&mut self, transaction: &Transaction) {
        match transaction.transaction_type {
            TransactionType::Income => self.total_income += transaction.amount,
            TransactionType::Expense => self.total_expense += transaction.amount,
        }
        self.net = self.total_income - self.total_expense;
    }

    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let mut totals = Totals::default();
        for transaction in transactions {
            totals.record(transaction);
        }
        totals
    }
}
