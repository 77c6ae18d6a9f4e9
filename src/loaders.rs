// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Data loading for each screen, independent of how it is presented.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::api::{CategoryApi, HomeSource, TransactionSource};
use crate::category_sync::{fetch_categories, CategoryBook};
use crate::error::ApiError;
use crate::models::{
    valid_transactions, Category, CategoryUpdate, HomeSummary, NewCategory, Transaction,
    TransactionType,
};
use crate::period::{aggregate, resolve_window, Aggregate, DateWindow, Granularity};
use crate::utils::{retry_request, RetryPolicy};

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub current_balance: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub recent_transactions: Vec<Transaction>,
}

impl From<HomeSummary> for HomeView {
    fn from(s: HomeSummary) -> Self {
        HomeView {
            current_balance: s.current_balance,
            total_income: s.total_income,
            total_expense: s.total_expense,
            recent_transactions: valid_transactions(&s.recent_transactions),
        }
    }
}

/// Dashboard totals plus the recent transactions that pass the shape check.
pub fn load_home<S: HomeSource + ?Sized>(source: &S) -> Result<HomeView, ApiError> {
    Ok(source.home()?.into())
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsView {
    pub reference: NaiveDate,
    #[serde(flatten)]
    pub aggregate: Aggregate,
}

/// Fetches the window around `reference` and aggregates it for the chart.
pub fn load_statistics<S: TransactionSource + ?Sized>(
    source: &S,
    granularity: Granularity,
    reference: NaiveDate,
    today: NaiveDate,
) -> Result<StatisticsView, ApiError> {
    let window = resolve_window(granularity, reference, today);
    let raw = source.list_transactions(Some(window))?;
    let transactions = valid_transactions(&raw);
    Ok(StatisticsView {
        reference: reference.min(today),
        aggregate: aggregate(&transactions, granularity, window),
    })
}

/// `pending` holds deletes an earlier run could not confirm; this fetch settles them.
pub fn load_categories<A: CategoryApi + ?Sized>(
    api: &A,
    retry: RetryPolicy,
    pending: BTreeSet<i64>,
) -> Result<CategoryBook, ApiError> {
    Ok(CategoryBook::new(fetch_categories(api, retry)?, pending))
}

pub fn add_category<A: CategoryApi + ?Sized>(
    api: &A,
    book: &mut CategoryBook,
    new: &NewCategory,
    retry: RetryPolicy,
) -> Result<Category, ApiError> {
    let created = retry_request(retry, || api.create_category(new))?;
    book.upsert(created.clone());
    Ok(created)
}

/// Default categories are read-only. The list is refetched after a successful edit.
pub fn edit_category<A: CategoryApi + ?Sized>(
    api: &A,
    book: &mut CategoryBook,
    id: i64,
    update: &CategoryUpdate,
    retry: RetryPolicy,
) -> Result<Category, ApiError> {
    match book.get(id) {
        None => return Err(ApiError::NotFound),
        Some(c) if c.is_default => {
            return Err(ApiError::Validation(
                "default categories cannot be edited".to_string(),
            ));
        }
        Some(_) => {}
    }
    let updated = retry_request(retry, || api.update_category(id, update))?;
    book.upsert(updated.clone());
    match fetch_categories(api, retry) {
        Ok(list) => book.replace(list),
        Err(e) => warn!(error = %e, "refetch after edit failed"),
    }
    Ok(updated)
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub kind: Option<TransactionType>,
    pub window: Option<DateWindow>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl SearchQuery {
    pub fn matches(&self, t: &Transaction) -> bool {
        if let Some(text) = self.text.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = text.to_lowercase();
            let in_description = t.description.to_lowercase().contains(&needle);
            let in_category = t
                .category_name
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle));
            if !in_description && !in_category {
                return false;
            }
        }
        if self.kind.is_some_and(|k| k != t.transaction_type) {
            return false;
        }
        if self.window.is_some_and(|w| !w.contains(t.date())) {
            return false;
        }
        if self.min_amount.is_some_and(|m| t.amount < m) {
            return false;
        }
        if self.max_amount.is_some_and(|m| t.amount > m) {
            return false;
        }
        true
    }
}

/// Matching transactions, newest first.
pub fn search_transactions<S: TransactionSource + ?Sized>(
    source: &S,
    query: &SearchQuery,
) -> Result<Vec<Transaction>, ApiError> {
    let raw = source.list_transactions(query.window)?;
    let mut hits: Vec<Transaction> = valid_transactions(&raw)
        .into_iter()
        .filter(|t| query.matches(t))
        .collect();
    hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(hits)
}
