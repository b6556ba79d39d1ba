//! Spending trend analysis
//!
//! Per-category trend classification plus an overall monthly direction.
//! Monthly buckets are keyed `"YYYY-MM"` and kept in a `BTreeMap`, so the
//! first/last comparison for the overall trend always runs over
//! chronologically sorted months regardless of input order (lexicographic
//! order coincides with chronological order for zero-padded month keys).

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::Transaction;

/// Minimum expense count before a category earns a trend label.
const MIN_CATEGORY_SAMPLES: usize = 3;

/// How many categories to surface as top spenders.
const TOP_CATEGORY_COUNT: usize = 5;

/// Direction of a single category's recent spending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Direction of total monthly spending, first bucket vs last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallTrend {
    Increasing,
    Decreasing,
    InsufficientData,
}

/// Per-category aggregates and trend label.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTrend {
    pub total_spent: f64,
    pub average_transaction: f64,
    pub transaction_count: usize,
    pub trend: TrendDirection,
    pub recent_average: f64,
}

/// Result of trend analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TrendReport {
    InsufficientData {
        error: String,
    },
    Analyzed {
        /// Categories with at least [`MIN_CATEGORY_SAMPLES`] expenses.
        category_analysis: HashMap<String, CategoryTrend>,
        overall_trend: OverallTrend,
        /// `"YYYY-MM"` -> total absolute expense for that month.
        monthly_spending: BTreeMap<String, f64>,
        /// Up to five analyzed categories by total spend, descending.
        top_categories: Vec<(String, CategoryTrend)>,
    },
}

/// Analyze spending trends across categories and months.
///
/// Only expense transactions participate. A category needs at least three
/// expenses before it is classified: its last three amounts (in input order)
/// are averaged and compared against the overall category average with a 10%
/// tolerance band - above the band is increasing, below is decreasing,
/// inside is stable.
pub fn analyze_trends(transactions: &[Transaction]) -> TrendReport {
    if transactions.is_empty() {
        return TrendReport::InsufficientData {
            error: "No transactions to analyze".to_string(),
        };
    }

    // Amounts per category in input order, and monthly expense buckets.
    let mut category_amounts: HashMap<String, Vec<f64>> = HashMap::new();
    let mut monthly_spending: BTreeMap<String, f64> = BTreeMap::new();

    for tx in transactions {
        if tx.amount >= 0.0 {
            continue;
        }
        let amount = tx.amount.abs();
        category_amounts
            .entry(tx.category.clone())
            .or_default()
            .push(amount);

        if let Some(month) = tx.month_key() {
            *monthly_spending.entry(month).or_insert(0.0) += amount;
        }
    }

    let mut category_analysis: HashMap<String, CategoryTrend> = HashMap::new();
    for (category, amounts) in &category_amounts {
        if amounts.len() < MIN_CATEGORY_SAMPLES {
            continue;
        }
        let total_spent: f64 = amounts.iter().sum();
        let average = total_spent / amounts.len() as f64;
        let recent: &[f64] = &amounts[amounts.len() - MIN_CATEGORY_SAMPLES..];
        let recent_average = recent.iter().sum::<f64>() / recent.len() as f64;

        let trend = if recent_average > average * 1.1 {
            TrendDirection::Increasing
        } else if recent_average < average * 0.9 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        category_analysis.insert(
            category.clone(),
            CategoryTrend {
                total_spent,
                average_transaction: average,
                transaction_count: amounts.len(),
                trend,
                recent_average,
            },
        );
    }

    let overall_trend = if monthly_spending.len() >= 2 {
        let first = monthly_spending.values().next().copied().unwrap_or(0.0);
        let last = monthly_spending.values().last().copied().unwrap_or(0.0);
        if last > first {
            OverallTrend::Increasing
        } else {
            OverallTrend::Decreasing
        }
    } else {
        OverallTrend::InsufficientData
    };

    let mut top_categories: Vec<(String, CategoryTrend)> = category_analysis
        .iter()
        .map(|(name, trend)| (name.clone(), trend.clone()))
        .collect();
    top_categories.sort_by(|a, b| {
        b.1.total_spent
            .partial_cmp(&a.1.total_spent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    top_categories.truncate(TOP_CATEGORY_COUNT);

    TrendReport::Analyzed {
        category_analysis,
        overall_trend,
        monthly_spending,
        top_categories,
    }
}
