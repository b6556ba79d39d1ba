//! Timeframe filtering for transaction collections

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::Transaction;

/// Time windows the API accepts for restricting transaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    #[default]
    All,
    LastWeek,
    LastMonth,
    LastQuarter,
    LastYear,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::All => "all",
            Timeframe::LastWeek => "last_week",
            Timeframe::LastMonth => "last_month",
            Timeframe::LastQuarter => "last_quarter",
            Timeframe::LastYear => "last_year",
        }
    }

    /// Window length in days, or None for `All`.
    fn window_days(&self) -> Option<i64> {
        match self {
            Timeframe::All => None,
            Timeframe::LastWeek => Some(7),
            Timeframe::LastMonth => Some(30),
            Timeframe::LastQuarter => Some(90),
            Timeframe::LastYear => Some(365),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Timeframe::All),
            "last_week" => Ok(Timeframe::LastWeek),
            "last_month" => Ok(Timeframe::LastMonth),
            "last_quarter" => Ok(Timeframe::LastQuarter),
            "last_year" => Ok(Timeframe::LastYear),
            _ => Err(format!("Unknown timeframe: {}", s)),
        }
    }
}

/// Restrict `transactions` to those dated on or after `now - timeframe`.
///
/// `Timeframe::All` returns the input unchanged, including transactions whose
/// dates do not parse. With a cutoff in effect, unparseable dates are dropped
/// with a warning rather than failing the whole request. Input order is
/// preserved.
pub fn filter_by_timeframe(transactions: &[Transaction], timeframe: Timeframe) -> Vec<Transaction> {
    filter_with_cutoff(
        transactions,
        timeframe
            .window_days()
            .map(|days| Utc::now().date_naive() - Duration::days(days)),
    )
}

fn filter_with_cutoff(transactions: &[Transaction], cutoff: Option<NaiveDate>) -> Vec<Transaction> {
    let Some(cutoff) = cutoff else {
        return transactions.to_vec();
    };

    transactions
        .iter()
        .filter(|tx| match tx.parsed_date() {
            Some(date) => date >= cutoff,
            None => {
                warn!(date = %tx.date, "Invalid date format in transaction, excluding from filter");
                false
            }
        })
        .cloned()
        .collect()
}
