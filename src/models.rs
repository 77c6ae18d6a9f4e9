// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Direction of money flow. Categories share the same two kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

pub type CategoryKind = TransactionType;

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    // The backend enum is upper-case while the client speaks lower-case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("Unknown transaction type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: Option<i64>,
    pub category_name: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    /// Shape check for a raw API record. Returns `None` when the record has no
    /// parseable `created_at`, no recognised `transaction_type`, or a
    /// non-numeric `amount`.
    pub fn from_value(v: &Value) -> Option<Transaction> {
        let obj = v.as_object()?;
        let created_at = parse_timestamp(obj.get("created_at")?.as_str()?)?;
        let transaction_type = obj
            .get("transaction_type")?
            .as_str()?
            .parse::<TransactionType>()
            .ok()?;
        let amount = parse_amount(obj.get("amount")?)?;
        Some(Transaction {
            id: obj.get("id").and_then(Value::as_i64).unwrap_or_default(),
            description: obj
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            amount,
            transaction_type,
            category: obj.get("category").and_then(Value::as_i64),
            category_name: obj
                .get("category_name")
                .and_then(Value::as_str)
                .map(str::to_string),
            created_at,
        })
    }

    /// Calendar date used for bucketing; the time of day is ignored.
    pub fn date(&self) -> NaiveDate {
        self.created_at.date()
    }
}

/// Keeps only the records that pass the shape check, silently dropping the rest.
pub fn valid_transactions(raw: &[Value]) -> Vec<Transaction> {
    let out: Vec<Transaction> = raw.iter().filter_map(Transaction::from_value).collect();
    if out.len() != raw.len() {
        tracing::debug!(
            dropped = raw.len() - out.len(),
            "dropped malformed transaction records"
        );
    }
    out
}

/// Accepts RFC 3339 (date taken in the record's own offset), naive timestamps, and bare dates.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_amount(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => {
            let s = n.to_string();
            s.parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_scientific(&s).ok())
        }
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub is_default: bool,
}

impl Category {
    pub fn icon_or_default(&self) -> &str {
        self.icon.as_deref().unwrap_or(DEFAULT_ICON)
    }
}

pub const DEFAULT_ICON: &str = "category";

/// Icon identifiers offered when creating or editing a category.
pub const CATEGORY_ICONS: &[(&str, &str)] = &[
    ("attach-money", "Salary"),
    ("card-giftcard", "Gifts"),
    ("trending-up", "Investment"),
    ("home", "Housing"),
    ("savings", "Savings"),
    ("more-horiz", "Other"),
    ("fastfood", "Food"),
    ("directions-bus", "Transport"),
    ("school", "Education"),
    ("receipt", "Bills"),
    (DEFAULT_ICON, "Default"),
];

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryUpdate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomeSummary {
    #[serde(default)]
    pub current_balance: Decimal,
    #[serde(default)]
    pub total_income: Decimal,
    #[serde(default)]
    pub total_expense: Decimal,
    #[serde(default)]
    pub recent_transactions: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthToken {
    pub token: String,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InitialBalance {
    #[serde(with = "rust_decimal::serde::float")]
    pub initial_balance: Decimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_string_amounts_and_upper_case_types() {
        let t = Transaction::from_value(&json!({
            "id": 7,
            "description": "Salary",
            "amount": "1500000.00",
            "transaction_type": "INCOME",
            "category": 2,
            "created_at": "2024-03-04T08:15:00+07:00"
        }))
        .unwrap();
        assert_eq!(t.amount, Decimal::new(150000000, 2));
        assert_eq!(t.transaction_type, TransactionType::Income);
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn date_follows_record_offset() {
        let t = Transaction::from_value(&json!({
            "amount": 1,
            "transaction_type": "expense",
            "created_at": "2024-03-04T23:30:00-05:00"
        }))
        .unwrap();
        assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn malformed_records_are_dropped() {
        let raw = vec![
            json!({"amount": 10, "transaction_type": "income", "created_at": "2024-01-01"}),
            json!({"amount": "abc", "transaction_type": "income", "created_at": "2024-01-01"}),
            json!({"amount": 10, "transaction_type": "transfer", "created_at": "2024-01-01"}),
            json!({"amount": 10, "transaction_type": "expense", "created_at": "yesterday"}),
            json!({"amount": 10, "transaction_type": "expense"}),
            json!("not an object"),
        ];
        assert_eq!(valid_transactions(&raw).len(), 1);
    }

    #[test]
    fn category_defaults_missing_fields() {
        let c: Category =
            serde_json::from_value(json!({"id": 3, "name": "Food", "type": "expense"})).unwrap();
        assert!(!c.is_default);
        assert_eq!(c.icon_or_default(), DEFAULT_ICON);
    }
}
