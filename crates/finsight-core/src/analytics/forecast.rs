//! Monthly expense forecasting
//!
//! Projects near-future monthly expenses with a simple linear trend over
//! chronologically sorted monthly buckets.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Transaction;

/// Buckets needed before the forecast is considered better than a guess.
const GOOD_DATA_MONTHS: usize = 6;

/// Confidence attached to each forecast month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Medium,
    Low,
}

/// Overall quality of the historical data behind the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Good,
    Limited,
}

/// A single projected month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthForecast {
    /// 1-based offset from the last observed month.
    pub month: u32,
    pub predicted_amount: f64,
    pub confidence: Confidence,
}

/// Result of forecasting.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ForecastReport {
    Error {
        error: String,
    },
    Forecast {
        forecasts: Vec<MonthForecast>,
        historical_average: f64,
        trend: f64,
        data_quality: DataQuality,
    },
}

/// Project expenses `months_ahead` months into the future.
///
/// Expenses are bucketed by `"YYYY-MM"` (unparseable dates skipped) and the
/// buckets sorted chronologically. The trend is the recent three-month
/// average minus the average of everything older, spread over the number of
/// older months. Each projection is floored at zero - a steep downward trend
/// never predicts negative spending.
pub fn forecast_spending(transactions: &[Transaction], months_ahead: u32) -> ForecastReport {
    if transactions.len() < 3 {
        return ForecastReport::Error {
            error: "Not enough data for forecasting".to_string(),
        };
    }

    let mut monthly: BTreeMap<String, f64> = BTreeMap::new();
    for tx in transactions {
        if tx.amount < 0.0 {
            if let Some(month) = tx.month_key() {
                *monthly.entry(month).or_insert(0.0) += tx.amount.abs();
            }
        }
    }

    if monthly.len() < 2 {
        return ForecastReport::Error {
            error: "Not enough monthly data for forecasting".to_string(),
        };
    }

    let values: Vec<f64> = monthly.values().copied().collect();
    let n = values.len();
    let historical_average = values.iter().sum::<f64>() / n as f64;

    let trend = if n >= 3 {
        let recent_avg = values[n - 3..].iter().sum::<f64>() / 3.0;
        let older_avg = if n > 3 {
            values[..n - 3].iter().sum::<f64>() / (n - 3) as f64
        } else {
            values[0]
        };
        (recent_avg - older_avg) / (n - 3).max(1) as f64
    } else {
        0.0
    };

    let confidence = if n >= GOOD_DATA_MONTHS {
        Confidence::Medium
    } else {
        Confidence::Low
    };
    let base = *values.last().expect("at least two buckets");

    let forecasts = (1..=months_ahead)
        .map(|i| MonthForecast {
            month: i,
            predicted_amount: (base + trend * i as f64).max(0.0),
            confidence,
        })
        .collect();

    ForecastReport::Forecast {
        forecasts,
        historical_average,
        trend,
        data_quality: if n >= GOOD_DATA_MONTHS {
            DataQuality::Good
        } else {
            DataQuality::Limited
        },
    }
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
    fn test_too_few_transactions() {
        let txns = vec![txn("2024-01-01", -10.0), txn("2024-02-01", -10.0)];
        let report = forecast_spending(&txns, 3);
        assert!(matches!(report, ForecastReport::Error { ref error }
            if error == "Not enough data for forecasting"));
    }

    #[test]
    fn test_single_month_of_data() {
        let txns = vec![
            txn("2024-01-01", -10.0),
            txn("2024-01-02", -10.0),
            txn("2024-01-03", -10.0),
        ];
        let report = forecast_spending(&txns, 3);
        assert!(matches!(report, ForecastReport::Error { ref error }
            if error == "Not enough monthly data for forecasting"));
    }

    #[test]
    fn test_forecast_length_and_nonnegative() {
        // Sharply decreasing spend: projections would go negative without
        // the floor.
        let txns = vec![
            txn("2024-01-05", -900.0),
            txn("2024-02-05", -500.0),
            txn("2024-03-05", -50.0),
        ];
        let ForecastReport::Forecast { forecasts, .. } = forecast_spending(&txns, 6) else {
            panic!("expected forecast");
        };
        assert_eq!(forecasts.len(), 6);
        for f in &forecasts {
            assert!(f.predicted_amount >= 0.0);
        }
        // Late months hit the floor exactly.
        assert_eq!(forecasts.last().unwrap().predicted_amount, 0.0);
    }

    #[test]
    fn test_exactly_three_months_uses_earliest_as_older_baseline() {
        // Buckets: 100, 200, 600. recent_avg = 300, older_avg = values[0]
        // = 100, trend = (300 - 100) / 1 = 200. Base month is 600.
        let txns = vec![
            txn("2024-01-05", -100.0),
            txn("2024-02-05", -200.0),
            txn("2024-03-05", -600.0),
        ];
        let ForecastReport::Forecast {
            forecasts,
            historical_average,
            trend,
            data_quality,
        } = forecast_spending(&txns, 2)
        else {
            panic!("expected forecast");
        };
        assert!((historical_average - 300.0).abs() < 1e-9);
        assert!((trend - 200.0).abs() < 1e-9);
        assert!((forecasts[0].predicted_amount - 800.0).abs() < 1e-9);
        assert!((forecasts[1].predicted_amount - 1000.0).abs() < 1e-9);
        assert_eq!(data_quality, DataQuality::Limited);
        assert_eq!(forecasts[0].confidence, Confidence::Low);
    }

    #[test]
    fn test_six_months_upgrades_confidence() {
        let txns: Vec<Transaction> = (1..=6)
            .map(|m| txn(&format!("2024-{:02}-10", m), -100.0))
            .collect();
        let ForecastReport::Forecast {
            forecasts,
            trend,
            data_quality,
            ..
        } = forecast_spending(&txns, 1)
        else {
            panic!("expected forecast");
        };
        assert_eq!(data_quality, DataQuality::Good);
        assert_eq!(forecasts[0].confidence, Confidence::Medium);
        // Flat history has zero trend.
        assert!(trend.abs() < 1e-9);
    }

    #[test]
    fn test_buckets_sorted_regardless_of_input_order() {
        // 2024-03 delivered first; it must still be the forecast base as the
        // chronologically last bucket.
        let txns = vec![
            txn("2024-03-05", -600.0),
            txn("2024-01-05", -100.0),
            txn("2024-02-05", -200.0),
        ];
        let ForecastReport::Forecast { forecasts, .. } = forecast_spending(&txns, 1) else {
            panic!("expected forecast");
        };
        // Same numbers as the in-order test: base 600 + trend 200.
        assert!((forecasts[0].predicted_amount - 800.0).abs() < 1e-9);
    }
}
