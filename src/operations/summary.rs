use crate::models::period::{PeriodKey, PeriodMode};
use crate::models::summary::Totals;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// Whole currency units with thousands grouped, e.g. `Rp 1,500,000`.
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{} {}{}", symbol, sign, grouped)
}

pub fn render_totals(totals: &Totals, symbol: &str) -> String {
    format!(
        "Total income:   {}\nTotal expense:  {}\nBalance:        {}",
        format_money(totals.total_income, symbol),
        format_money(totals.total_expense, symbol),
        format_money(totals.net, symbol),
    )
}

pub fn render_periods(
    aggregate: &BTreeMap<PeriodKey, Totals>,
    mode: PeriodMode,
    symbol: &str,
) -> String {
    let mut lines = vec![format!(
        "{:<10} {:>18} {:>18} {:>18}",
        mode.unit(),
        "Income",
        "Expense",
        "Net"
    )];
    for (key, totals) in aggregate {
        lines.push(format!(
            "{:<10} {:>18} {:>18} {:>18}",
            key.to_string(),
            format_money(totals.total_income, symbol),
            format_money(totals.total_expense, symbol),
            format_money(totals.net, symbol),
        ));
    }
    lines.join("\n")
}

/// Breakdown entries sorted by amount, largest first. Ties keep the
/// alphabetical order of the map.
pub fn sorted_breakdown(breakdown: &BTreeMap<String, Decimal>) -> Vec<(String, Decimal)> {
    let mut entries: Vec<(String, Decimal)> = breakdown
        .iter()
        .map(|(description, amount)| (description.clone(), *amount))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

pub fn render_breakdown(
    key: PeriodKey,
    breakdown: &BTreeMap<String, Decimal>,
    symbol: &str,
) -> String {
    if breakdown.is_empty() {
        return format!("No expenses in {}.", key);
    }

    let total: Decimal = breakdown.values().copied().sum();
    let mut lines = vec![format!("Expenses {}", key)];
    for (description, amount) in sorted_breakdown(breakdown) {
        let share = (amount / total * Decimal::ONE_HUNDRED).round_dp(1);
        lines.push(format!(
            "  {:<24} {:>18} {:>6}%",
            description,
            format_money(amount, symbol),
            share
        ));
    }
    lines.push(format!("  {:<24} {:>18}", "Total", format_money(total, symbol)));
    lines.join("\n")
}
