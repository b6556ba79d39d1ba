//! Income/expense summarization

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// Totals and per-category breakdown for a transaction set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_income: f64,
    /// Category -> total absolute expense. Income transactions are excluded.
    pub category_breakdown: HashMap<String, f64>,
    pub transaction_count: usize,
}

/// Compute income and expense totals for a transaction set.
///
/// Positive amounts count as income, negative amounts as expenses. Dates are
/// not consulted, so transactions with unparseable dates still contribute.
/// Empty input yields an all-zero summary.
pub fn summarize(transactions: &[Transaction]) -> SpendingSummary {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut category_breakdown: HashMap<String, f64> = HashMap::new();

    for tx in transactions {
        if tx.amount > 0.0 {
            total_income += tx.amount;
        } else {
            let amount = tx.amount.abs();
            total_expenses += amount;
            *category_breakdown.entry(tx.category.clone()).or_insert(0.0) += amount;
        }
    }

    SpendingSummary {
        total_income,
        total_expenses,
        net_income: total_income - total_expenses,
        category_breakdown,
        transaction_count: transactions.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(date: &str, amount: f64, category: &str) -> Transaction {
        Transaction {
            date: date.to_string(),
            amount,
            category: category.to_string(),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.net_income, 0.0);
        assert!(summary.category_breakdown.is_empty());
        assert_eq!(summary.transaction_count, 0);
    }

    #[test]
    fn test_net_income_identity() {
        let txns = vec![
            txn("2024-01-05", 2000.0, "salary"),
            txn("2024-01-10", -600.0, "food"),
            txn("2024-02-10", -650.0, "food"),
            txn("2024-03-10", -700.0, "food"),
        ];
        let summary = summarize(&txns);
        assert!((summary.total_income - 2000.0).abs() < 1e-9);
        assert!((summary.total_expenses - 1950.0).abs() < 1e-9);
        assert!((summary.net_income - 50.0).abs() < 1e-9);
        assert!(
            (summary.total_income - summary.total_expenses - summary.net_income).abs() < 1e-9
        );
    }

    #[test]
    fn test_breakdown_excludes_income_categories() {
        let txns = vec![
            txn("2024-01-05", 2000.0, "salary"),
            txn("2024-01-06", -40.0, "food"),
            txn("bad-date", -10.0, "food"),
        ];
        let summary = summarize(&txns);
        assert!(!summary.category_breakdown.contains_key("salary"));
        // Unparseable dates still count toward sign-based aggregates.
        assert!((summary.category_breakdown["food"] - 50.0).abs() < 1e-9);
        assert_eq!(summary.transaction_count, 3);
    }
}
