// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::RefCell;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use smartexpense::api::{HomeSource, TransactionSource};
use smartexpense::error::ApiError;
use smartexpense::loaders::{load_home, load_statistics, search_transactions, SearchQuery};
use smartexpense::models::{HomeSummary, TransactionType};
use smartexpense::period::{DateWindow, Granularity};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Returns a fixed list and records the windows it was asked for.
struct FakeSource {
    records: Vec<Value>,
    seen: RefCell<Vec<Option<DateWindow>>>,
}

impl FakeSource {
    fn new(records: Vec<Value>) -> Self {
        FakeSource {
            records,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl TransactionSource for FakeSource {
    fn list_transactions(&self, window: Option<DateWindow>) -> Result<Vec<Value>, ApiError> {
        self.seen.borrow_mut().push(window);
        Ok(self.records.clone())
    }
}

struct DownSource;

impl TransactionSource for DownSource {
    fn list_transactions(&self, _: Option<DateWindow>) -> Result<Vec<Value>, ApiError> {
        Err(ApiError::Network("unreachable".into()))
    }
}

fn records() -> Vec<Value> {
    vec![
        json!({"id": 1, "description": "March salary", "amount": "15000000", "transaction_type": "income",
               "category_name": "Salary", "created_at": "2024-03-01T08:00:00+07:00"}),
        json!({"id": 2, "description": "Pho", "amount": 45000, "transaction_type": "expense",
               "category_name": "Food", "created_at": "2024-03-04T12:10:00+07:00"}),
        json!({"id": 3, "description": "Bus card", "amount": 200000, "transaction_type": "expense",
               "category_name": "Transport", "created_at": "2024-03-05T07:30:00+07:00"}),
        json!({"id": 4, "description": "broken", "amount": 1, "transaction_type": "expense"}),
    ]
}

#[test]
fn statistics_fetch_the_resolved_window() {
    let source = FakeSource::new(records());
    let view = load_statistics(&source, Granularity::Week, d(2024, 3, 6), d(2024, 3, 6)).unwrap();
    let window = DateWindow {
        start: d(2024, 3, 4),
        end: d(2024, 3, 6),
    };
    assert_eq!(source.seen.borrow().as_slice(), &[Some(window)]);
    assert_eq!(view.aggregate.window, window);
    assert_eq!(view.aggregate.buckets[0].expense, Decimal::from(45000));
    assert_eq!(view.aggregate.buckets[1].expense, Decimal::from(200000));
    // the salary is outside the week even though the source returned it
    assert_eq!(view.aggregate.totals.income, Decimal::ZERO);
    assert_eq!(view.aggregate.totals.expense_count, 2);
}

#[test]
fn statistics_clamp_a_future_reference() {
    let source = FakeSource::new(records());
    let view = load_statistics(&source, Granularity::Month, d(2030, 1, 1), d(2024, 3, 6)).unwrap();
    assert_eq!(view.reference, d(2024, 3, 6));
    assert_eq!(view.aggregate.window.end, d(2024, 3, 6));
    assert_eq!(view.aggregate.totals.income, Decimal::from(15_000_000));
    assert_eq!(view.aggregate.scale.max_value, Decimal::from(20));
}

#[test]
fn statistics_surface_source_errors() {
    let err = load_statistics(&DownSource, Granularity::Day, d(2024, 3, 6), d(2024, 3, 6)).unwrap_err();
    assert!(err.is_transient());
}

#[test]
fn search_matches_text_in_description_or_category() {
    let source = FakeSource::new(records());
    let q = SearchQuery {
        text: Some("  FOOD ".into()),
        ..Default::default()
    };
    let hits = search_transactions(&source, &q).unwrap();
    assert_eq!(hits.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);

    let q = SearchQuery {
        text: Some("bus".into()),
        ..Default::default()
    };
    assert_eq!(search_transactions(&source, &q).unwrap()[0].id, 3);
}

#[test]
fn search_filters_combine_and_sort_newest_first() {
    let source = FakeSource::new(records());
    let all = search_transactions(&source, &SearchQuery::default()).unwrap();
    assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 2, 1]);

    let q = SearchQuery {
        kind: Some(TransactionType::Expense),
        min_amount: Some(Decimal::from(100000)),
        ..Default::default()
    };
    let hits = search_transactions(&source, &q).unwrap();
    assert_eq!(hits.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3]);

    let window = DateWindow {
        start: d(2024, 3, 1),
        end: d(2024, 3, 4),
    };
    let q = SearchQuery {
        window: Some(window),
        max_amount: Some(Decimal::from(1_000_000)),
        ..Default::default()
    };
    let hits = search_transactions(&source, &q).unwrap();
    assert_eq!(hits.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
    assert_eq!(source.seen.borrow().last(), Some(&Some(window)));
}

struct FakeHome(Result<HomeSummary, u16>);

impl HomeSource for FakeHome {
    fn home(&self) -> Result<HomeSummary, ApiError> {
        match &self.0 {
            Ok(summary) => Ok(summary.clone()),
            Err(status) => Err(ApiError::from_response(*status, r#"{"detail":"Invalid token."}"#)),
        }
    }
}

#[test]
fn home_keeps_only_well_formed_recent_transactions() {
    let summary: HomeSummary = serde_json::from_value(json!({
        "current_balance": 1200000,
        "total_income": "1500000.00",
        "total_expense": 300000,
        "recent_transactions": [
            {"id": 9, "description": "Salary", "amount": "1500000.00", "transaction_type": "INCOME",
             "created_at": "2024-03-01T08:00:00+07:00"},
            {"id": 10, "amount": 300000, "transaction_type": "EXPENSE", "created_at": "2024-03-02"},
            {"id": 11, "amount": 5, "transaction_type": "LOAN", "created_at": "2024-03-02"},
            {"id": 12, "amount": 5, "transaction_type": "expense"}
        ]
    }))
    .unwrap();
    let view = load_home(&FakeHome(Ok(summary))).unwrap();
    assert_eq!(view.current_balance, Decimal::from(1_200_000));
    assert_eq!(view.total_income, Decimal::from(1_500_000));
    let ids: Vec<i64> = view.recent_transactions.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![9, 10]);
    assert_eq!(view.recent_transactions[0].transaction_type, TransactionType::Income);
}

#[test]
fn home_with_missing_fields_defaults_to_zero() {
    let summary: HomeSummary = serde_json::from_value(json!({})).unwrap();
    let view = load_home(&FakeHome(Ok(summary))).unwrap();
    assert_eq!(view.current_balance, Decimal::ZERO);
    assert!(view.recent_transactions.is_empty());
}

#[test]
fn home_auth_failure_is_reported_as_auth() {
    let err = load_home(&FakeHome(Err(401))).unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.user_message(), "Invalid token.");
}
