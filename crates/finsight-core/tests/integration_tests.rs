//! Integration tests for finsight-core
//!
//! These tests exercise the full store → analytics → advisor workflow over a
//! realistic document directory.

use std::time::Duration;

use serde_json::json;

use finsight_core::{
    analyze_trends, build_prompt, detect_anomalies, recommend_budget, summarize, Advisor,
    AiClient, DocumentStore, FinancialHealth, MockProvider, Permissions, ProviderError,
    SessionManager, Timeframe, TrendReport,
};

/// One quarter of data: steady salary plus food spending that creeps up.
fn seed_quarter(dir: &std::path::Path) {
    let docs = [
        (
            "assets.json",
            json!({"bank_accounts": [{"balance": 5000.0}], "property": [{"estimated_value": 20000.0}]}),
        ),
        ("liabilities.json", json!({"loans": [{"balance": 8000.0}]})),
        (
            "transactions.json",
            json!({"transactions": [
                {"date": "2024-01-05", "amount": 2000.0, "category": "salary"},
                {"date": "2024-01-10", "amount": -600.0, "category": "food"},
                {"date": "2024-02-10", "amount": -650.0, "category": "food"},
                {"date": "2024-03-10", "amount": -700.0, "category": "food"}
            ]}),
        ),
        (
            "credit_score.json",
            json!({"current_score": 742, "score_range": "Good"}),
        ),
    ];
    for (name, value) in docs {
        std::fs::write(dir.join(name), serde_json::to_string(&value).unwrap()).unwrap();
    }
}

#[test]
fn test_store_to_analytics_flow() {
    let dir = tempfile::tempdir().unwrap();
    seed_quarter(dir.path());

    let data = DocumentStore::new(dir.path()).load();
    let transactions = data.transaction_list();
    assert_eq!(transactions.len(), 4);

    let summary = summarize(&transactions);
    assert!((summary.total_income - 2000.0).abs() < 1e-9);
    assert!((summary.total_expenses - 1950.0).abs() < 1e-9);
    assert!((summary.net_income - 50.0).abs() < 1e-9);
    assert!((summary.category_breakdown["food"] - 1950.0).abs() < 1e-9);

    // Identical recent and overall food averages: a stable label.
    let TrendReport::Analyzed {
        category_analysis,
        monthly_spending,
        ..
    } = analyze_trends(&transactions)
    else {
        panic!("expected analyzed trends");
    };
    assert_eq!(
        serde_json::to_value(&category_analysis["food"].trend).unwrap(),
        "stable"
    );
    assert_eq!(monthly_spending.len(), 3);

    // Too few transactions for anomaly detection; structured result, not an
    // error.
    assert_eq!(detect_anomalies(&transactions).total_anomalies(), 0);

    // Savings rate 50/2000 = 2.5%: needs improvement.
    let report = recommend_budget(&transactions);
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(
        value["financial_health"],
        serde_json::to_value(FinancialHealth::NeedsImprovement).unwrap()
    );
}

#[test]
fn test_permission_filtering_reaches_prompt() {
    let dir = tempfile::tempdir().unwrap();
    seed_quarter(dir.path());
    let data = DocumentStore::new(dir.path()).load();

    let mut perms = Permissions::default();
    perms.set("credit_score".parse().unwrap(), false);
    let filtered = data.filtered(&perms);

    let prompt = build_prompt("how am I doing?", &filtered, &[]);
    assert!(!prompt.contains("Credit Score"));
    assert!(prompt.contains("Total Assets: $25,000.00"));
    assert!(prompt.contains("Total Liabilities: $8,000.00"));
}

#[tokio::test(start_paused = true)]
async fn test_advisor_retry_then_conversation_append() {
    let mock = MockProvider::with_script(vec![
        Err(ProviderError::RateLimited),
        Ok("• Keep food spending flat".to_string()),
    ]);
    let advisor = Advisor::new(AiClient::Mock(mock.clone())).with_timeout(Duration::from_secs(60));

    let sessions = SessionManager::new();
    let session = sessions.init();

    let answer = advisor.ask("prompt").await.unwrap();
    assert_eq!(answer, "• Keep food spending flat");
    assert_eq!(mock.calls(), 2);

    sessions.append_turn(&session.id, "how am I doing?", &answer);
    let history = sessions.recent_turns(&session.id);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].ai_response, answer);
}

#[test]
fn test_timeframe_round_trip() {
    for name in ["all", "last_week", "last_month", "last_quarter", "last_year"] {
        let tf: Timeframe = name.parse().unwrap();
        assert_eq!(tf.as_str(), name);
    }
    assert!("fortnight".parse::<Timeframe>().is_err());
}
