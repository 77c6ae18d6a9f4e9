// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Period windows and chart aggregation for the statistics view.
//!
//! A [`Granularity`] plus a reference date resolves to a [`DateWindow`]
//! whose end never passes today. Transactions inside the window are then
//! summed into per-bucket income/expense pairs: one bucket for a day, one
//! per weekday for a week, four "weeks" for a month and twelve months for
//! a year.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    pub fn bucket_count(&self) -> usize {
        match self {
            Granularity::Day => 1,
            Granularity::Week => 7,
            Granularity::Month => 4,
            Granularity::Year => 12,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        };
        f.write_str(s)
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "d" => Ok(Granularity::Day),
            "week" | "w" => Ok(Granularity::Week),
            "month" | "m" => Ok(Granularity::Month),
            "year" | "y" => Ok(Granularity::Year),
            other => Err(format!(
                "Unknown period '{}', expected day, week, month or year",
                other
            )),
        }
    }
}

/// Inclusive calendar-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%d/%m/%Y"),
            self.end.format("%d/%m/%Y")
        )
    }
}

/// Resolves the window for `granularity` around `reference`.
///
/// A reference date after `today` is treated as today, and the end of the
/// window is clipped to `today`, so `start <= end <= today` always holds.
pub fn resolve_window(
    granularity: Granularity,
    reference: NaiveDate,
    today: NaiveDate,
) -> DateWindow {
    let reference = reference.min(today);
    let (start, end) = match granularity {
        Granularity::Day => (reference, reference),
        Granularity::Week => {
            let start =
                reference - Duration::days(i64::from(reference.weekday().num_days_from_monday()));
            (start, start + Duration::days(6))
        }
        Granularity::Month => {
            let start = reference - Duration::days(i64::from(reference.day0()));
            let end = start
                .checked_add_months(Months::new(1))
                .and_then(|d| d.pred_opt())
                .unwrap_or(today);
            (start, end)
        }
        Granularity::Year => {
            let start = reference - Duration::days(i64::from(reference.ordinal0()));
            let end = NaiveDate::from_ymd_opt(reference.year(), 12, 31).unwrap_or(today);
            (start, end)
        }
    };
    DateWindow {
        start,
        end: end.min(today),
    }
}

/// Moves the reference date by `steps` periods (negative goes back). Never moves past today.
pub fn shift(
    granularity: Granularity,
    reference: NaiveDate,
    steps: i32,
    today: NaiveDate,
) -> NaiveDate {
    let months = |n: i32| {
        let m = Months::new(n.unsigned_abs());
        if n >= 0 {
            reference.checked_add_months(m)
        } else {
            reference.checked_sub_months(m)
        }
    };
    let moved = match granularity {
        Granularity::Day => reference.checked_add_signed(Duration::days(i64::from(steps))),
        Granularity::Week => reference.checked_add_signed(Duration::weeks(i64::from(steps))),
        Granularity::Month => months(steps),
        Granularity::Year => months(steps.saturating_mul(12)),
    };
    moved.unwrap_or(reference).min(today)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub income: Decimal,
    pub expense: Decimal,
}

impl Bucket {
    fn empty(label: String) -> Self {
        Bucket {
            label,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        }
    }

    pub fn income_millions(&self) -> Decimal {
        to_millions(self.income)
    }

    pub fn expense_millions(&self) -> Decimal {
        to_millions(self.expense)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
}

impl Totals {
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

/// Y-axis ceiling and tick step, both in millions of currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartScale {
    pub max_value: Decimal,
    pub step: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub granularity: Granularity,
    pub window: DateWindow,
    pub buckets: Vec<Bucket>,
    pub totals: Totals,
    pub scale: ChartScale,
}

/// Sums `transactions` inside `window` into the buckets for `granularity`.
pub fn aggregate(
    transactions: &[Transaction],
    granularity: Granularity,
    window: DateWindow,
) -> Aggregate {
    let mut buckets: Vec<Bucket> = (0..granularity.bucket_count())
        .map(|i| Bucket::empty(bucket_label(granularity, window, i)))
        .collect();
    let mut totals = Totals::default();

    for t in transactions {
        let date = t.date();
        if !window.contains(date) {
            continue;
        }
        let Some(idx) = bucket_index(granularity, window, date) else {
            continue;
        };
        let bucket = &mut buckets[idx];
        match t.transaction_type {
            TransactionType::Income => {
                bucket.income += t.amount;
                totals.income += t.amount;
                totals.income_count += 1;
            }
            TransactionType::Expense => {
                bucket.expense += t.amount;
                totals.expense += t.amount;
                totals.expense_count += 1;
            }
        }
    }

    let peak = buckets
        .iter()
        .flat_map(|b| [b.income_millions(), b.expense_millions()])
        .max()
        .unwrap_or(Decimal::ZERO);

    Aggregate {
        granularity,
        window,
        buckets,
        totals,
        scale: chart_scale(peak),
    }
}

fn bucket_index(granularity: Granularity, window: DateWindow, date: NaiveDate) -> Option<usize> {
    match granularity {
        Granularity::Day => (date == window.start).then_some(0),
        Granularity::Week => usize::try_from((date - window.start).num_days())
            .ok()
            .filter(|i| *i < 7),
        // days 29..31 fold into the last "week"
        Granularity::Month => Some((date.day0() as usize / 7).min(3)),
        Granularity::Year => Some(date.month0() as usize),
    }
}

fn bucket_label(granularity: Granularity, window: DateWindow, idx: usize) -> String {
    match granularity {
        Granularity::Day => window.start.format("%d/%m").to_string(),
        Granularity::Week => (window.start + Duration::days(idx as i64))
            .format("%d/%m")
            .to_string(),
        Granularity::Month => format!("Week {}", idx + 1),
        Granularity::Year => MONTH_LABELS[idx].to_string(),
    }
}

pub fn to_millions(amount: Decimal) -> Decimal {
    amount / Decimal::from(1_000_000)
}

/// Picks the chart ceiling from the ladder 0.1, 0.5, 1, 10, then multiples of 20.
/// A peak sitting exactly on a rung stays on that rung.
pub fn chart_scale(peak_millions: Decimal) -> ChartScale {
    let rungs = [
        (Decimal::new(1, 1), Decimal::new(2, 2)),
        (Decimal::new(5, 1), Decimal::new(1, 1)),
        (Decimal::ONE, Decimal::new(2, 1)),
        (Decimal::TEN, Decimal::from(2)),
    ];
    for (ceiling, step) in rungs {
        if peak_millions <= ceiling {
            return ChartScale {
                max_value: ceiling,
                step,
            };
        }
    }
    let twenty = Decimal::from(20);
    let max_value = (peak_millions / twenty).ceil() * twenty;
    ChartScale {
        max_value,
        step: max_value / Decimal::from(5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn shift_month_clamps_to_month_end() {
        let today = d(2024, 12, 31);
        assert_eq!(shift(Granularity::Month, d(2024, 3, 31), -1, today), d(2024, 2, 29));
        assert_eq!(shift(Granularity::Year, d(2023, 6, 1), 1, today), d(2024, 6, 1));
    }

    #[test]
    fn shift_never_passes_today() {
        let today = d(2024, 3, 6);
        assert_eq!(shift(Granularity::Week, d(2024, 3, 1), 1, today), today);
        assert_eq!(shift(Granularity::Day, d(2024, 3, 6), -1, today), d(2024, 3, 5));
    }

    #[test]
    fn ladder_boundaries_stay_on_rung() {
        assert_eq!(chart_scale(Decimal::new(5, 1)).max_value, Decimal::new(5, 1));
        assert_eq!(chart_scale(Decimal::new(51, 2)).max_value, Decimal::ONE);
        assert_eq!(chart_scale(Decimal::TEN).step, Decimal::from(2));
        let big = chart_scale(Decimal::from(41));
        assert_eq!(big.max_value, Decimal::from(60));
        assert_eq!(big.step, Decimal::from(12));
    }

    #[test]
    fn parses_period_names() {
        assert_eq!("Week".parse::<Granularity>(), Ok(Granularity::Week));
        assert!("fortnight".parse::<Granularity>().is_err());
    }
}
