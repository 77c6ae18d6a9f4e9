// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ApiError;

const UA: &str = concat!(
    "smartexpense/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/smartexpense)"
);

pub fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client, ApiError> {
    let c = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(UA)
        .build()?;
    Ok(c)
}

/// Fixed-delay retry budget for category list/add/edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            attempts: 5,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the attempts run out.
pub fn retry_request<T, F>(policy: RetryPolicy, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Result<T, ApiError>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if e.is_transient() && attempt < attempts => {
                tracing::warn!(attempt, attempts, error = %e, "request failed, retrying");
                if !policy.delay.is_zero() {
                    thread::sleep(policy.delay);
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Integer part with `.` as the thousands separator, e.g. `1.250.000`.
pub fn fmt_grouped(d: Decimal) -> String {
    let whole = d.trunc().abs().to_string();
    let mut out = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if d.is_sign_negative() && !d.trunc().is_zero() {
        out.insert(0, '-');
    }
    out
}

pub fn fmt_money(d: Decimal) -> String {
    format!("{} VND", fmt_grouped(d))
}

/// Bar label for a value already expressed in millions.
pub fn fmt_millions(value: Decimal) -> String {
    let round = |dp| value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if value.is_zero() {
        "0M".to_string()
    } else if value < Decimal::new(1, 1) {
        format!("{:.3}M", round(3))
    } else if value < Decimal::ONE {
        format!("{:.1}M", round(1))
    } else {
        format!("{}M", round(0))
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as StdCell;

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(fmt_grouped(Decimal::from(1_250_000)), "1.250.000");
        assert_eq!(fmt_grouped(Decimal::new(99950, 2)), "999");
        assert_eq!(fmt_grouped(Decimal::from(-12_000)), "-12.000");
        assert_eq!(fmt_grouped(Decimal::ZERO), "0");
    }

    #[test]
    fn million_labels_switch_precision() {
        assert_eq!(fmt_millions(Decimal::ZERO), "0M");
        assert_eq!(fmt_millions(Decimal::new(5, 2)), "0.050M");
        assert_eq!(fmt_millions(Decimal::new(25, 2)), "0.3M");
        assert_eq!(fmt_millions(Decimal::new(125, 1)), "13M");
    }

    #[test]
    fn retry_stops_on_permanent_error() {
        let calls = StdCell::new(0);
        let res: Result<(), ApiError> = retry_request(RetryPolicy::default(), || {
            calls.set(calls.get() + 1);
            Err(ApiError::NotFound)
        });
        assert!(res.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn retry_gives_up_after_attempts() {
        let calls = StdCell::new(0);
        let policy = RetryPolicy {
            attempts: 3,
            delay: Duration::ZERO,
        };
        let res: Result<(), ApiError> = retry_request(policy, || {
            calls.set(calls.get() + 1);
            Err(ApiError::Timeout)
        });
        assert!(matches!(res, Err(ApiError::Timeout)));
        assert_eq!(calls.get(), 3);
    }
}
