//! Budget recommendations against fixed target allocations

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::Transaction;

/// Target spending as a fraction of monthly income, per category.
///
/// Adapted from the 50/30/20 rule. Categories outside this table (housing
/// included) get no recommendation.
const TARGET_ALLOCATIONS: [(&str, f64); 5] = [
    ("food", 0.15),
    ("transportation", 0.12),
    ("utilities", 0.08),
    ("entertainment", 0.05),
    ("other", 0.10),
];

/// Months of income to suggest keeping as an emergency fund.
const EMERGENCY_FUND_MONTHS: f64 = 6.0;

/// Whether a category is within its target allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OverBudget,
    UnderBudget,
    OnTrack,
}

/// Overall financial health, classified from the savings rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialHealth {
    Excellent,
    Good,
    NeedsImprovement,
    Concerning,
}

impl FinancialHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialHealth::Excellent => "excellent",
            FinancialHealth::Good => "good",
            FinancialHealth::NeedsImprovement => "needs_improvement",
            FinancialHealth::Concerning => "concerning",
        }
    }
}

/// One per-category recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetRecommendation {
    pub category: String,
    pub current_spending: f64,
    pub recommended_spending: f64,
    pub difference: f64,
    pub status: BudgetStatus,
    pub suggestion: String,
}

/// Result of budget recommendation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BudgetReport {
    Error {
        error: String,
    },
    Recommendations {
        recommendations: Vec<BudgetRecommendation>,
        current_savings_rate: f64,
        financial_health: FinancialHealth,
        total_monthly_income: f64,
        total_monthly_expenses: f64,
        suggested_emergency_fund: f64,
    },
}

/// Compare actual category spending against target percentages of monthly
/// income.
///
/// Monthly income is total income divided by the number of distinct months
/// income arrived in (floored at one to avoid dividing by zero). A category
/// is over budget when it exceeds its recommendation by more than 20%, under
/// budget when it sits more than 10% below it. Recommendations appear in
/// first-seen category order.
pub fn recommend_budget(transactions: &[Transaction]) -> BudgetReport {
    if transactions.is_empty() {
        return BudgetReport::Error {
            error: "No transactions to analyze".to_string(),
        };
    }

    let mut category_spending: HashMap<String, f64> = HashMap::new();
    let mut category_order: Vec<String> = Vec::new();
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut income_months: HashSet<String> = HashSet::new();

    for tx in transactions {
        if tx.amount > 0.0 {
            total_income += tx.amount;
            // Month prefix of the raw date string, matching the bucketing
            // used elsewhere for well-formed dates.
            income_months.insert(tx.date.chars().take(7).collect());
        } else {
            let amount = tx.amount.abs();
            total_expenses += amount;
            if !category_spending.contains_key(&tx.category) {
                category_order.push(tx.category.clone());
            }
            *category_spending.entry(tx.category.clone()).or_insert(0.0) += amount;
        }
    }

    if total_expenses == 0.0 {
        return BudgetReport::Error {
            error: "No expense data found".to_string(),
        };
    }

    let monthly_income = total_income / income_months.len().max(1) as f64;

    let targets: HashMap<&str, f64> = TARGET_ALLOCATIONS.iter().copied().collect();
    let mut recommendations = Vec::new();

    for category in &category_order {
        let Some(target_fraction) = targets.get(category.as_str()) else {
            continue;
        };
        let current_spending = category_spending[category];
        let recommended_spending = monthly_income * target_fraction;
        let difference = current_spending - recommended_spending;

        let (status, suggestion) = if difference > recommended_spending * 0.2 {
            (
                BudgetStatus::OverBudget,
                format!("Consider reducing {} spending by ${:.2}", category, difference),
            )
        } else if difference < -recommended_spending * 0.1 {
            (
                BudgetStatus::UnderBudget,
                format!("You have ${:.2} buffer in {}", difference.abs(), category),
            )
        } else {
            (
                BudgetStatus::OnTrack,
                format!("{} spending is within recommended range", category),
            )
        };

        recommendations.push(BudgetRecommendation {
            category: category.clone(),
            current_spending,
            recommended_spending,
            difference,
            status,
            suggestion,
        });
    }

    let current_savings_rate = if total_income > 0.0 {
        (total_income - total_expenses) / total_income
    } else {
        0.0
    };

    let financial_health = if current_savings_rate >= 0.2 {
        FinancialHealth::Excellent
    } else if current_savings_rate >= 0.1 {
        FinancialHealth::Good
    } else if current_savings_rate >= 0.0 {
        FinancialHealth::NeedsImprovement
    } else {
        FinancialHealth::Concerning
    };

    BudgetReport::Recommendations {
        recommendations,
        current_savings_rate,
        financial_health,
        total_monthly_income: monthly_income,
        total_monthly_expenses: total_expenses,
        suggested_emergency_fund: monthly_income * EMERGENCY_FUND_MONTHS,
    }
}
