//! Core data model shared between the analytics engine, the advisor, and the
//! API layer.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single financial transaction.
///
/// The sign of `amount` determines the classification: positive amounts are
/// income, negative amounts are expenses. Fields beyond the three the
/// analytics engine reads (description, merchant, account, ...) are preserved
/// verbatim in `extra` so API responses round-trip the source documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// ISO 8601 calendar date (`YYYY-MM-DD`). Kept as a string; unparseable
    /// dates exclude the transaction from date-bucketed computations but not
    /// from sign-based aggregates.
    pub date: String,
    pub amount: f64,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn default_category() -> String {
    "other".to_string()
}

impl Transaction {
    /// Parse the transaction date, if well-formed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// `"YYYY-MM"` bucket key for monthly aggregation. None when the date
    /// does not parse.
    pub fn month_key(&self) -> Option<String> {
        self.parsed_date().map(|d| d.format("%Y-%m").to_string())
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// The six per-user financial documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Assets,
    Liabilities,
    Transactions,
    Epf,
    CreditScore,
    Investments,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::Assets,
        DataType::Liabilities,
        DataType::Transactions,
        DataType::Epf,
        DataType::CreditScore,
        DataType::Investments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Assets => "assets",
            DataType::Liabilities => "liabilities",
            DataType::Transactions => "transactions",
            DataType::Epf => "epf",
            DataType::CreditScore => "credit_score",
            DataType::Investments => "investments",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assets" => Ok(DataType::Assets),
            "liabilities" => Ok(DataType::Liabilities),
            "transactions" => Ok(DataType::Transactions),
            "epf" => Ok(DataType::Epf),
            "credit_score" => Ok(DataType::CreditScore),
            "investments" => Ok(DataType::Investments),
            _ => Err(format!("Unknown data type: {}", s)),
        }
    }
}

/// Per-session data access permissions, one flag per document.
///
/// Everything is visible by default; the user can revoke access to individual
/// documents and the advisor prompt only sees what remains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permissions {
    pub assets: bool,
    pub liabilities: bool,
    pub transactions: bool,
    pub epf: bool,
    pub credit_score: bool,
    pub investments: bool,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            assets: true,
            liabilities: true,
            transactions: true,
            epf: true,
            credit_score: true,
            investments: true,
        }
    }
}

impl Permissions {
    pub fn allows(&self, data_type: DataType) -> bool {
        match data_type {
            DataType::Assets => self.assets,
            DataType::Liabilities => self.liabilities,
            DataType::Transactions => self.transactions,
            DataType::Epf => self.epf,
            DataType::CreditScore => self.credit_score,
            DataType::Investments => self.investments,
        }
    }

    pub fn set(&mut self, data_type: DataType, allowed: bool) {
        match data_type {
            DataType::Assets => self.assets = allowed,
            DataType::Liabilities => self.liabilities = allowed,
            DataType::Transactions => self.transactions = allowed,
            DataType::Epf => self.epf = allowed,
            DataType::CreditScore => self.credit_score = allowed,
            DataType::Investments => self.investments = allowed,
        }
    }

    /// Names of the documents this permission set exposes, in declaration
    /// order. Used as the context-source component of cache keys.
    pub fn allowed_sources(&self) -> Vec<&'static str> {
        DataType::ALL
            .iter()
            .filter(|dt| self.allows(**dt))
            .map(|dt| dt.as_str())
            .collect()
    }
}

/// A user's full financial snapshot: the six documents as loaded from the
/// store, permission-filtered before they reach the prompt builder.
#[derive(Debug, Clone, Default)]
pub struct FinancialData {
    pub assets: Value,
    pub liabilities: Value,
    pub transactions: Value,
    pub epf: Value,
    pub credit_score: Value,
    pub investments: Value,
}

impl FinancialData {
    pub fn get(&self, data_type: DataType) -> &Value {
        match data_type {
            DataType::Assets => &self.assets,
            DataType::Liabilities => &self.liabilities,
            DataType::Transactions => &self.transactions,
            DataType::Epf => &self.epf,
            DataType::CreditScore => &self.credit_score,
            DataType::Investments => &self.investments,
        }
    }

    pub fn set(&mut self, data_type: DataType, value: Value) {
        match data_type {
            DataType::Assets => self.assets = value,
            DataType::Liabilities => self.liabilities = value,
            DataType::Transactions => self.transactions = value,
            DataType::Epf => self.epf = value,
            DataType::CreditScore => self.credit_score = value,
            DataType::Investments => self.investments = value,
        }
    }

    /// A copy with every document the permissions deny replaced by an empty
    /// object.
    pub fn filtered(&self, permissions: &Permissions) -> FinancialData {
        let mut filtered = FinancialData::default();
        for dt in DataType::ALL {
            if permissions.allows(dt) {
                filtered.set(dt, self.get(dt).clone());
            } else {
                filtered.set(dt, Value::Object(Default::default()));
            }
        }
        filtered
    }

    /// The transaction collection embedded in the transactions document
    /// (`{"transactions": [...]}`). Entries that fail to deserialize are
    /// skipped.
    pub fn transaction_list(&self) -> Vec<Transaction> {
        self.transactions
            .get("transactions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sum of account balances across every asset category. Accounts report
    /// their worth as `balance`, `value`, or `estimated_value` depending on
    /// the asset class.
    pub fn total_assets(&self) -> f64 {
        let mut total = 0.0;
        if let Some(categories) = self.assets.as_object() {
            for accounts in categories.values() {
                if let Some(accounts) = accounts.as_array() {
                    for account in accounts {
                        total += account
                            .get("balance")
                            .or_else(|| account.get("value"))
                            .or_else(|| account.get("estimated_value"))
                            .and_then(Value::as_f64)
                            .unwrap_or(0.0);
                    }
                }
            }
        }
        total
    }

    /// Sum of `balance` fields across every liability category.
    pub fn total_liabilities(&self) -> f64 {
        let mut total = 0.0;
        if let Some(categories) = self.liabilities.as_object() {
            for liabilities in categories.values() {
                if let Some(liabilities) = liabilities.as_array() {
                    for liability in liabilities {
                        total += liability
                            .get("balance")
                            .and_then(Value::as_f64)
                            .unwrap_or(0.0);
                    }
                }
            }
        }
        total
    }

    pub fn net_worth(&self) -> NetWorth {
        let total_assets = self.total_assets();
        let total_liabilities = self.total_liabilities();
        NetWorth {
            total_assets,
            total_liabilities,
            net_worth: total_assets - total_liabilities,
        }
    }
}

/// Net worth summary derived from the asset and liability documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetWorth {
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
}

/// One turn of the advisor conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// RFC 3339 timestamp of when the turn completed.
    pub timestamp: String,
    pub user_query: String,
    pub ai_response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn txn(date: &str, amount: f64, category: &str) -> Transaction {
        Transaction {
            date: date.to_string(),
            amount,
            category: category.to_string(),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_transaction_month_key() {
        assert_eq!(
            txn("2024-03-15", -50.0, "food").month_key(),
            Some("2024-03".to_string())
        );
        assert_eq!(txn("not-a-date", -50.0, "food").month_key(), None);
    }

    #[test]
    fn test_transaction_deserialization_defaults_category() {
        let tx: Transaction =
            serde_json::from_value(json!({"date": "2024-01-01", "amount": -12.5})).unwrap();
        assert_eq!(tx.category, "other");
    }

    #[test]
    fn test_transaction_preserves_extra_fields() {
        let tx: Transaction = serde_json::from_value(json!({
            "date": "2024-01-01",
            "amount": -12.5,
            "category": "food",
            "merchant": "Cafe Luna"
        }))
        .unwrap();
        assert_eq!(tx.extra.get("merchant").unwrap(), "Cafe Luna");

        let back = serde_json::to_value(&tx).unwrap();
        assert_eq!(back["merchant"], "Cafe Luna");
    }

    #[test]
    fn test_data_type_round_trip() {
        for dt in DataType::ALL {
            assert_eq!(dt.as_str().parse::<DataType>().unwrap(), dt);
        }
        assert!("pensions".parse::<DataType>().is_err());
    }

    #[test]
    fn test_total_assets_mixed_value_fields() {
        let data = FinancialData {
            assets: json!({
                "bank_accounts": [{"balance": 1000.0}, {"balance": 500.0}],
                "investments": [{"value": 2500.0}],
                "property": [{"estimated_value": 10000.0}]
            }),
            ..Default::default()
        };
        assert!((data.total_assets() - 14000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_net_worth() {
        let data = FinancialData {
            assets: json!({"bank_accounts": [{"balance": 3000.0}]}),
            liabilities: json!({"loans": [{"balance": 1200.0}]}),
            ..Default::default()
        };
        let nw = data.net_worth();
        assert!((nw.net_worth - 1800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_permissions_filtering() {
        let mut perms = Permissions::default();
        perms.set(DataType::CreditScore, false);

        let data = FinancialData {
            credit_score: json!({"current_score": 760}),
            ..Default::default()
        };
        let filtered = data.filtered(&perms);
        assert!(filtered.credit_score.as_object().unwrap().is_empty());
        assert!(!perms
            .allowed_sources()
            .contains(&DataType::CreditScore.as_str()));
    }
}
