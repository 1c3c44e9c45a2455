pub mod session;

use crate::error::ValidationError;
use crate::models::period::{PeriodKey, PeriodMode, WeekKey};
use crate::models::summary::Totals;
use crate::models::transaction::Transaction;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Append-only, in-memory list of transactions for one session.
///
/// Period keys are never stored; every query derives them from the
/// transaction dates.
#[derive(Debug, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    week_key: WeekKey,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_week_key(week_key: WeekKey) -> Self {
        Self {
            transactions: Vec::new(),
            week_key,
        }
    }

    pub fn week_key(&self) -> WeekKey {
        self.week_key
    }

    /// Checks the entry rules without touching the ledger.
    pub fn validate(transaction: &Transaction) -> Result<(), ValidationError> {
        if transaction.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        if transaction.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(transaction.amount));
        }
        Ok(())
    }

    pub fn append(&mut self, mut transaction: Transaction) -> Result<(), ValidationError> {
        if let Err(err) = Self::validate(&transaction) {
            tracing::warn!(error = %err, "rejected transaction");
            return Err(err);
        }

        let trimmed = transaction.description.trim();
        if trimmed.len() != transaction.description.len() {
            transaction.description = trimmed.to_string();
        }

        tracing::info!(
            date = %transaction.date,
            kind = %transaction.transaction_type,
            amount = %transaction.amount,
            "appended transaction"
        );
        self.transactions.push(transaction);
        Ok(())
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn period_key(&self, transaction: &Transaction, mode: PeriodMode) -> PeriodKey {
        PeriodKey::for_date(transaction.date, mode, self.week_key)
    }

    pub fn totals(&self) -> Totals {
        Totals::from_transactions(&self.transactions)
    }

    /// Income, expense and net per period, ascending by period.
    pub fn aggregate(&self, mode: PeriodMode) -> BTreeMap<PeriodKey, Totals> {
        let mut periods: BTreeMap<PeriodKey, Totals> = BTreeMap::new();
        for transaction in &self.transactions {
            periods
                .entry(self.period_key(transaction, mode))
                .or_default()
                .record(transaction);
        }
        tracing::debug!(mode = %mode, periods = periods.len(), "aggregated ledger");
        periods
    }

    pub fn periods(&self, mode: PeriodMode) -> Vec<PeriodKey> {
        self.aggregate(mode).into_keys().collect()
    }

    pub fn transactions_for_period(&self, mode: PeriodMode, key: PeriodKey) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|transaction| self.period_key(transaction, mode) == key)
            .collect()
    }

    /// Expenses of one period summed per description. An empty map is a
    /// normal answer for a period without expenses.
    pub fn expense_breakdown(&self, mode: PeriodMode, key: PeriodKey) -> BTreeMap<String, Decimal> {
        let mut breakdown: BTreeMap<String, Decimal> = BTreeMap::new();
        for transaction in self.transactions_for_period(mode, key) {
            if !transaction.is_expense() {
                continue;
            }
            *breakdown
                .entry(transaction.description.clone())
                .or_insert(Decimal::ZERO) += transaction.amount;
        }
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::TransactionType;
    use chrono::NaiveDate;

    fn create_test_transaction(
        date: (i32, u32, u32),
        transaction_type: TransactionType,
        description: &str,
        amount: i64,
    ) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("Invalid date"),
            transaction_type,
            description,
            Decimal::new(amount, 0),
        )
    }

    fn scenario_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger
            .append(create_test_transaction((2024, 1, 10), TransactionType::Income, "Allowance", 500000))
            .unwrap();
        ledger
            .append(create_test_transaction((2024, 1, 15), TransactionType::Expense, "Food", 150000))
            .unwrap();
        ledger
            .append(create_test_transaction((2024, 2, 1), TransactionType::Expense, "Books", 200000))
            .unwrap();
        ledger
    }

    fn month(year: i32, month: u32) -> PeriodKey {
        PeriodKey::Month { year, month }
    }

    #[test]
    fn test_scenario_totals() {
        let ledger = scenario_ledger();
        let totals = ledger.totals();
        assert_eq!(totals.total_income, Decimal::new(500000, 0));
        assert_eq!(totals.total_expense, Decimal::new(350000, 0));
        assert_eq!(totals.net, Decimal::new(150000, 0));
    }

    #[test]
    fn test_scenario_monthly_aggregate() {
        let ledger = scenario_ledger();
        let aggregate = ledger.aggregate(PeriodMode::Monthly);

        assert_eq!(aggregate.len(), 2);
        let january = aggregate[&month(2024, 1)];
        assert_eq!(january.total_income, Decimal::new(500000, 0));
        assert_eq!(january.total_expense, Decimal::new(150000, 0));
        assert_eq!(january.net, Decimal::new(350000, 0));

        let february = aggregate[&month(2024, 2)];
        assert_eq!(february.total_income, Decimal::ZERO);
        assert_eq!(february.total_expense, Decimal::new(200000, 0));
        assert_eq!(february.net, Decimal::new(-200000, 0));

        let keys: Vec<String> = aggregate.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2024-01", "2024-02"]);
    }

    #[test]
    fn test_append_empty_description_rejected() {
        let mut ledger = Ledger::new();
        let result = ledger.append(create_test_transaction((2024, 1, 1), TransactionType::Income, "", 1000));
        assert_eq!(result, Err(ValidationError::MissingDescription));
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn test_append_whitespace_description_rejected() {
        let mut ledger = scenario_ledger();
        let result = ledger.append(create_test_transaction((2024, 1, 1), TransactionType::Expense, "   ", 10));
        assert_eq!(result, Err(ValidationError::MissingDescription));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_append_non_positive_amount_rejected() {
        let mut ledger = scenario_ledger();
        let zero = ledger.append(create_test_transaction((2024, 1, 1), TransactionType::Expense, "Snack", 0));
        assert_eq!(zero, Err(ValidationError::NonPositiveAmount(Decimal::ZERO)));
        let negative = ledger.append(create_test_transaction((2024, 1, 1), TransactionType::Income, "Refund", -5));
        assert_eq!(negative, Err(ValidationError::NonPositiveAmount(Decimal::new(-5, 0))));
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.totals(), scenario_ledger().totals());
    }

    #[test]
    fn test_append_trims_description_and_keeps_order() {
        let mut ledger = Ledger::new();
        ledger
            .append(create_test_transaction((2024, 3, 2), TransactionType::Expense, "  Coffee ", 20))
            .unwrap();
        ledger
            .append(create_test_transaction((2024, 3, 1), TransactionType::Income, "Job", 100))
            .unwrap();
        assert_eq!(ledger.transactions()[0].description, "Coffee");
        assert_eq!(ledger.transactions()[1].description, "Job");
    }

    #[test]
    fn test_net_equals_income_minus_expense() {
        let mut ledger = Ledger::new();
        let amounts = [(TransactionType::Income, 12345), (TransactionType::Expense, 999), (TransactionType::Expense, 20001), (TransactionType::Income, 7)];
        for (i, (kind, amount)) in amounts.iter().enumerate() {
            ledger
                .append(create_test_transaction((2024, 1 + i as u32, 3), *kind, "Entry", *amount))
                .unwrap();
            let totals = ledger.totals();
            assert_eq!(totals.net, totals.total_income - totals.total_expense);
        }
    }

    #[test]
    fn test_period_sums_match_transactions_for_period() {
        let mut ledger = scenario_ledger();
        ledger
            .append(create_test_transaction((2024, 2, 20), TransactionType::Income, "Scholarship", 750000))
            .unwrap();

        for mode in [PeriodMode::Monthly, PeriodMode::Weekly] {
            for (key, totals) in ledger.aggregate(mode) {
                let txs = ledger.transactions_for_period(mode, key);
                let income: Decimal = txs.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
                let expense: Decimal = txs.iter().filter(|t| t.is_expense()).map(|t| t.amount).sum();
                assert_eq!(income, totals.total_income);
                assert_eq!(expense, totals.total_expense);

                let breakdown: Decimal = ledger.expense_breakdown(mode, key).values().copied().sum();
                assert_eq!(breakdown, totals.total_expense);
            }
        }
    }

    #[test]
    fn test_transactions_for_period_preserves_insertion_order() {
        let mut ledger = Ledger::new();
        ledger
            .append(create_test_transaction((2024, 1, 20), TransactionType::Expense, "Late", 1))
            .unwrap();
        ledger
            .append(create_test_transaction((2024, 2, 1), TransactionType::Expense, "Other", 1))
            .unwrap();
        ledger
            .append(create_test_transaction((2024, 1, 5), TransactionType::Expense, "Early", 1))
            .unwrap();

        let january = ledger.transactions_for_period(PeriodMode::Monthly, month(2024, 1));
        let names: Vec<&str> = january.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["Late", "Early"]);
    }

    #[test]
    fn test_expense_breakdown_scenario() {
        let ledger = scenario_ledger();
        let february = ledger.expense_breakdown(PeriodMode::Monthly, month(2024, 2));
        assert_eq!(february.len(), 1);
        assert_eq!(february["Books"], Decimal::new(200000, 0));

        let march = ledger.expense_breakdown(PeriodMode::Monthly, month(2024, 3));
        assert!(march.is_empty());
    }

    #[test]
    fn test_expense_breakdown_sums_same_description_and_skips_income() {
        let mut ledger = scenario_ledger();
        ledger
            .append(create_test_transaction((2024, 1, 28), TransactionType::Expense, "Food", 50000))
            .unwrap();
        let january = ledger.expense_breakdown(PeriodMode::Monthly, month(2024, 1));
        assert_eq!(january.len(), 1);
        assert_eq!(january["Food"], Decimal::new(200000, 0));
        assert!(!january.contains_key("Allowance"));
    }

    #[test]
    fn test_queries_are_idempotent() {
        let ledger = scenario_ledger();
        assert_eq!(ledger.aggregate(PeriodMode::Monthly), ledger.aggregate(PeriodMode::Monthly));
        assert_eq!(ledger.aggregate(PeriodMode::Weekly), ledger.aggregate(PeriodMode::Weekly));
        assert_eq!(ledger.totals(), ledger.totals());
        assert_eq!(
            ledger.expense_breakdown(PeriodMode::Monthly, month(2024, 1)),
            ledger.expense_breakdown(PeriodMode::Monthly, month(2024, 1))
        );
    }

    #[test]
    fn test_weekly_iso_key_keeps_years_apart() {
        let mut ledger = Ledger::with_week_key(WeekKey::Iso);
        ledger
            .append(create_test_transaction((2023, 3, 22), TransactionType::Expense, "Rent", 100))
            .unwrap();
        ledger
            .append(create_test_transaction((2024, 3, 20), TransactionType::Expense, "Rent", 300))
            .unwrap();

        let weekly = ledger.aggregate(PeriodMode::Weekly);
        assert_eq!(weekly.len(), 2);
        assert_eq!(
            weekly[&PeriodKey::Week { year: 2024, week: 12 }].total_expense,
            Decimal::new(300, 0)
        );
    }

    #[test]
    fn test_weekly_number_key_merges_years() {
        let mut ledger = Ledger::with_week_key(WeekKey::Number);
        ledger
            .append(create_test_transaction((2023, 3, 22), TransactionType::Expense, "Rent", 100))
            .unwrap();
        ledger
            .append(create_test_transaction((2024, 3, 20), TransactionType::Expense, "Rent", 300))
            .unwrap();

        let weekly = ledger.aggregate(PeriodMode::Weekly);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[&PeriodKey::WeekNumber(12)].total_expense, Decimal::new(400, 0));
    }

    #[test]
    fn test_periods_ascending() {
        let mut ledger = Ledger::new();
        ledger
            .append(create_test_transaction((2024, 5, 1), TransactionType::Income, "B", 1))
            .unwrap();
        ledger
            .append(create_test_transaction((2023, 12, 1), TransactionType::Income, "A", 1))
            .unwrap();
        assert_eq!(ledger.periods(PeriodMode::Monthly), vec![month(2023, 12), month(2024, 5)]);
    }
}
