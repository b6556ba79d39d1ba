//! Advisor prompt construction
//!
//! Pure function from (query, permission-filtered financial data, recent
//! conversation turns) to the full prompt text. The financial summary block
//! only includes sections whose backing documents are present, and the
//! analytics augmentation degrades silently when there is not enough data.

use serde_json::Value;
use tracing::debug;

use crate::analytics::{
    analyze_trends, detect_anomalies, recommend_budget, BudgetReport, TrendReport,
};
use crate::models::{ConversationEntry, FinancialData, Transaction};

/// How many recent transactions to acknowledge in the summary.
const TRANSACTION_PREVIEW_COUNT: usize = 5;

const INSTRUCTIONS: &str = r#"IMPORTANT FORMATTING REQUIREMENTS:
- ALWAYS format your response using bullet points (*) or numbered lists (1., 2., 3.)
- Break down information into clear, readable bullet points
- Do NOT write long paragraphs
- Each major point should be a separate bullet point
- Use sub-bullets for details when needed

Instructions:
1. Provide clear, actionable financial advice based on the user's data
2. Be specific and reference actual numbers from their financial data when relevant
3. Suggest concrete steps they can take to improve their financial situation
4. If the query is about spending, analyze their transaction patterns and use the advanced insights provided
5. If the query is about investments, provide insights on their portfolio performance
6. If the query is about debt, analyze their liabilities and suggest repayment strategies
7. Always maintain a professional, helpful, and encouraging tone
8. If you don't have enough data to answer a question, say so and suggest what information would be helpful
9. FORMAT ALL RESPONSES WITH BULLET POINTS - NO LONG PARAGRAPHS

Please provide your response in bullet point format:"#;

/// Build the full advisor prompt.
pub fn build_prompt(
    user_query: &str,
    data: &FinancialData,
    history: &[ConversationEntry],
) -> String {
    let mut prompt = String::from(
        "You are a professional financial advisor AI assistant. You have access to the \
         user's financial data and can provide personalized financial advice, analysis, \
         and insights.\n",
    );

    if !history.is_empty() {
        prompt.push_str("\nPrevious conversation:\n");
        for turn in history {
            prompt.push_str(&format!(
                "User: {}\nAssistant: {}\n\n",
                turn.user_query, turn.ai_response
            ));
        }
    }

    prompt.push_str(&format!("\nCurrent User Query: {}\n", user_query));
    prompt.push_str(&financial_summary(data));
    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    prompt
}

/// The financial data summary block. Empty string when no documents are
/// visible.
fn financial_summary(data: &FinancialData) -> String {
    let mut summary = String::new();

    if has_content(&data.assets) {
        summary.push_str(&format!(
            "Total Assets: ${}\n",
            format_money(data.total_assets())
        ));
    }

    if has_content(&data.liabilities) {
        summary.push_str(&format!(
            "Total Liabilities: ${}\n",
            format_money(data.total_liabilities())
        ));
    }

    if has_content(&data.transactions) {
        let transactions = data.transaction_list();
        if !transactions.is_empty() {
            let preview = transactions.len().min(TRANSACTION_PREVIEW_COUNT);
            summary.push_str(&format!("Recent Transactions: {} transactions\n", preview));
            summary.push_str(&advanced_insights(&transactions));
        }
    }

    if let Some(portfolio) = data.investments.get("portfolio") {
        let value = portfolio
            .get("total_value")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let gain = portfolio
            .get("total_gain_loss")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let gain_pct = portfolio
            .get("total_gain_loss_percentage")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        summary.push_str(&format!(
            "Investment Portfolio Value: ${}\n",
            format_money(value)
        ));
        summary.push_str(&format!(
            "Total Gain/Loss: ${} ({:.1}%)\n",
            format_money(gain),
            gain_pct
        ));
    }

    if let Some(score) = data.credit_score.get("current_score").and_then(Value::as_i64) {
        let range = data
            .credit_score
            .get("score_range")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        summary.push_str(&format!("Credit Score: {} ({})\n", score, range));
    }

    if summary.is_empty() {
        String::new()
    } else {
        format!("\nFinancial Data Summary:\n{}", summary)
    }
}

/// At most one sentence each from the anomaly, trend, and budget analyses.
/// Any analysis without enough data simply contributes nothing.
fn advanced_insights(transactions: &[Transaction]) -> String {
    let mut insights = String::new();

    let anomalies = detect_anomalies(transactions);
    if anomalies.total_anomalies() > 0 {
        insights.push_str(&format!(
            "- {} unusual spending transactions detected\n",
            anomalies.total_anomalies()
        ));
    }

    if let TrendReport::Analyzed {
        category_analysis, ..
    } = analyze_trends(transactions)
    {
        let top = category_analysis.iter().max_by(|a, b| {
            a.1.total_spent
                .partial_cmp(&b.1.total_spent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some((category, _)) = top {
            insights.push_str(&format!("- Highest spending category: {}\n", category));
        }
    }

    if let BudgetReport::Recommendations {
        financial_health,
        current_savings_rate,
        ..
    } = recommend_budget(transactions)
    {
        insights.push_str(&format!(
            "- Financial health status: {}\n",
            financial_health.as_str()
        ));
        insights.push_str(&format!(
            "- Current savings rate: {:.1}%\n",
            current_savings_rate * 100.0
        ));
    }

    if insights.is_empty() {
        debug!("No analytics insights available for prompt");
        String::new()
    } else {
        format!("\nAdvanced Insights:\n{}", insights)
    }
}

fn has_content(doc: &Value) -> bool {
    doc.as_object().map(|o| !o.is_empty()).unwrap_or(false)
}

/// Format a dollar amount with thousands separators and two decimals.
fn format_money(amount: f64) -> String {
    let negative = amount < 0.0;
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let whole: String = grouped.chars().rev().collect();

    if negative {
        format!("-{}.{}", whole, cents)
    } else {
        format!("{}.{}", whole, cents)
    }
}
