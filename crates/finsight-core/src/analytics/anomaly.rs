//! Statistical anomaly detection over expense amounts

use serde::Serialize;

use crate::models::Transaction;

/// An expense flagged as unusually large.
#[derive(Debug, Clone, Serialize)]
pub struct AnomalousTransaction {
    pub transaction: Transaction,
    /// Absolute expense amount.
    pub amount: f64,
    pub threshold: f64,
    /// How far past the threshold the amount landed.
    pub deviation: f64,
}

/// Result of anomaly detection. Insufficient-data outcomes serialize as
/// `{"anomalies": [], "message": "..."}` so the API contract matches the
/// analyzed shape without ever being an error.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnomalyReport {
    NoData {
        anomalies: Vec<AnomalousTransaction>,
        message: String,
    },
    Analyzed {
        anomalies: Vec<AnomalousTransaction>,
        threshold: f64,
        mean_expense: f64,
        std_deviation: f64,
        total_anomalies: usize,
    },
}

impl AnomalyReport {
    pub fn anomalies(&self) -> &[AnomalousTransaction] {
        match self {
            AnomalyReport::NoData { anomalies, .. } => anomalies,
            AnomalyReport::Analyzed { anomalies, .. } => anomalies,
        }
    }

    pub fn total_anomalies(&self) -> usize {
        match self {
            AnomalyReport::NoData { .. } => 0,
            AnomalyReport::Analyzed {
                total_anomalies, ..
            } => *total_anomalies,
        }
    }
}

/// Flag expense transactions whose absolute amount is more than two sample
/// standard deviations above the mean expense.
///
/// Requires at least 5 transactions overall and at least one expense. With a
/// single expense value the standard deviation is taken as 0, which makes the
/// threshold the mean itself. Anomalies come back in input order, not
/// severity order.
pub fn detect_anomalies(transactions: &[Transaction]) -> AnomalyReport {
    if transactions.len() < 5 {
        return AnomalyReport::NoData {
            anomalies: Vec::new(),
            message: "Not enough data for anomaly detection".to_string(),
        };
    }

    let expenses: Vec<f64> = transactions
        .iter()
        .filter(|tx| tx.amount < 0.0)
        .map(|tx| tx.amount.abs())
        .collect();

    if expenses.is_empty() {
        return AnomalyReport::NoData {
            anomalies: Vec::new(),
            message: "No expense transactions found".to_string(),
        };
    }

    let mean_expense = expenses.iter().sum::<f64>() / expenses.len() as f64;
    let std_deviation = sample_std_dev(&expenses, mean_expense);
    let threshold = mean_expense + 2.0 * std_deviation;

    let anomalies: Vec<AnomalousTransaction> = transactions
        .iter()
        .filter(|tx| tx.amount < 0.0 && tx.amount.abs() > threshold)
        .map(|tx| AnomalousTransaction {
            transaction: tx.clone(),
            amount: tx.amount.abs(),
            threshold,
            deviation: tx.amount.abs() - threshold,
        })
        .collect();

    AnomalyReport::Analyzed {
        total_anomalies: anomalies.len(),
        anomalies,
        threshold,
        mean_expense,
        std_deviation,
    }
}

/// Sample standard deviation (n - 1 denominator); 0 with fewer than two
/// values, where the variance is undefined.
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(date: &str, amount: f64) -> Transaction {
        Transaction {
            date: date.to_string(),
            amount,
            category: "other".to_string(),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_fewer_than_five_transactions() {
        let txns = vec![
            txn("2024-01-01", -100.0),
            txn("2024-01-02", -100.0),
            txn("2024-01-03", -5000.0),
            txn("2024-01-04", -100.0),
        ];
        let report = detect_anomalies(&txns);
        assert!(matches!(report, AnomalyReport::NoData { ref message, .. }
            if message == "Not enough data for anomaly detection"));
    }

    #[test]
    fn test_no_expense_transactions() {
        let txns: Vec<Transaction> = (1..=5)
            .map(|d| txn(&format!("2024-01-{:02}", d), 100.0))
            .collect();
        let report = detect_anomalies(&txns);
        assert!(matches!(report, AnomalyReport::NoData { ref message, .. }
            if message == "No expense transactions found"));
    }

    #[test]
    fn test_outlier_is_flagged_against_recomputed_stats() {
        // Nine steady expenses plus one far outlier. Mean/std are recomputed
        // over all ten (mean 390, sample std ~917), and the outlier still
        // clears mean + 2*std (~2224).
        let mut txns: Vec<Transaction> = (1..=9)
            .map(|d| txn(&format!("2024-01-{:02}", d), -100.0))
            .collect();
        txns.push(txn("2024-01-10", -3000.0));

        let report = detect_anomalies(&txns);
        let AnomalyReport::Analyzed {
            anomalies,
            threshold,
            mean_expense,
            std_deviation,
            total_anomalies,
        } = report
        else {
            panic!("expected analyzed report");
        };

        assert_eq!(total_anomalies, 1);
        assert_eq!(anomalies[0].transaction.date, "2024-01-10");
        assert!((anomalies[0].amount - 3000.0).abs() < 1e-9);
        assert!((anomalies[0].deviation - (3000.0 - threshold)).abs() < 1e-9);
        assert!((mean_expense - 390.0).abs() < 1e-9);
        assert!(std_deviation > 0.0);
        assert!(threshold > mean_expense);
        assert!(threshold < 3000.0);
    }

    #[test]
    fn test_single_expense_has_zero_std() {
        let txns = vec![
            txn("2024-01-01", 100.0),
            txn("2024-01-02", 100.0),
            txn("2024-01-03", 100.0),
            txn("2024-01-04", 100.0),
            txn("2024-01-05", -250.0),
        ];
        let report = detect_anomalies(&txns);
        let AnomalyReport::Analyzed {
            threshold,
            std_deviation,
            total_anomalies,
            ..
        } = report
        else {
            panic!("expected analyzed report");
        };
        assert_eq!(std_deviation, 0.0);
        // Threshold collapses to the mean; the sole expense equals it and is
        // not strictly greater, so nothing is flagged.
        assert!((threshold - 250.0).abs() < 1e-9);
        assert_eq!(total_anomalies, 0);
    }

    #[test]
    fn test_anomalies_follow_input_order() {
        // Ten small expenses of 10 plus two large ones. Mean ~858, sample
        // std ~1982, threshold ~4822 - both 5000 and 5200 are flagged.
        let mut txns: Vec<Transaction> = (1..=10)
            .map(|d| txn(&format!("2024-01-{:02}", d), -10.0))
            .collect();
        txns.insert(3, txn("2024-01-20", -5000.0));
        txns.push(txn("2024-01-21", -5200.0));

        let report = detect_anomalies(&txns);
        let dates: Vec<&str> = report
            .anomalies()
            .iter()
            .map(|a| a.transaction.date.as_str())
            .collect();
        // Input order, even though the later anomaly is more severe.
        assert_eq!(dates, vec!["2024-01-20", "2024-01-21"]);
    }
}
