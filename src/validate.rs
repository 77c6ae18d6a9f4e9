// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{
    CategoryKind, CategoryUpdate, Credentials, NewTransaction, ProfileUpdate, Registration,
    TransactionType, CATEGORY_ICONS, DEFAULT_ICON,
};

pub const MIN_PASSWORD_LEN: usize = 6;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every problem found in one form, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == name)
            .map(|e| e.message.as_str())
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn check_username(errs: &mut ValidationErrors, username: &str) {
    if username.trim().is_empty() {
        errs.push("username", "Username must not be empty");
    }
}

fn check_password(errs: &mut ValidationErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errs.push(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
}

pub fn login(username: &str, password: &str) -> Result<Credentials, ValidationErrors> {
    let mut errs = ValidationErrors::default();
    check_username(&mut errs, username);
    check_password(&mut errs, password);
    errs.into_result(|| Credentials {
        username: username.trim().to_string(),
        password: password.to_string(),
    })
}

pub fn registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<Registration, ValidationErrors> {
    let mut errs = ValidationErrors::default();
    check_username(&mut errs, username);
    if !EMAIL_RE.is_match(email.trim()) {
        errs.push("email", "Invalid email address");
    }
    check_password(&mut errs, password);
    errs.into_result(|| Registration {
        username: username.trim().to_string(),
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}

fn parse_amount(errs: &mut ValidationErrors, field: &'static str, raw: &str) -> Option<Decimal> {
    match raw.trim().parse::<Decimal>() {
        Ok(v) => Some(v),
        Err(_) => {
            errs.push(field, "Please enter a valid number");
            None
        }
    }
}

/// Initial balance: numeric and not negative.
pub fn initial_balance(raw: &str) -> Result<Decimal, ValidationErrors> {
    let mut errs = ValidationErrors::default();
    let value = parse_amount(&mut errs, "initial_balance", raw);
    if value.is_some_and(|v| v.is_sign_negative() && !v.is_zero()) {
        errs.push("initial_balance", "Balance must not be negative");
    }
    errs.into_result(|| value.unwrap_or_default())
}

/// Transaction form: positive amount, known type.
pub fn transaction(
    amount: &str,
    kind: &str,
    description: Option<&str>,
    category: Option<i64>,
) -> Result<NewTransaction, ValidationErrors> {
    let mut errs = ValidationErrors::default();
    let value = parse_amount(&mut errs, "amount", amount);
    if value.is_some_and(|v| v <= Decimal::ZERO) {
        errs.push("amount", "Amount must be greater than zero");
    }
    let transaction_type = match kind.parse::<TransactionType>() {
        Ok(t) => Some(t),
        Err(e) => {
            errs.push("transaction_type", e);
            None
        }
    };
    errs.into_result(|| NewTransaction {
        description: description.map(str::trim).unwrap_or_default().to_string(),
        amount: value.unwrap_or_default(),
        transaction_type: transaction_type.unwrap_or(TransactionType::Expense),
        category,
    })
}

/// Category form: non-empty name, known type, icon from the offered set.
pub fn category(
    name: &str,
    kind: &str,
    icon: Option<&str>,
) -> Result<CategoryUpdate, ValidationErrors> {
    let mut errs = ValidationErrors::default();
    if name.trim().is_empty() {
        errs.push("name", "Please enter a category name");
    }
    let parsed: Option<CategoryKind> = match kind.parse() {
        Ok(k) => Some(k),
        Err(e) => {
            errs.push("type", e);
            None
        }
    };
    let icon = icon.map(str::trim).unwrap_or(DEFAULT_ICON);
    if !CATEGORY_ICONS.iter().any(|(id, _)| *id == icon) {
        errs.push("icon", format!("Unknown icon '{}'", icon));
    }
    errs.into_result(|| CategoryUpdate {
        name: name.trim().to_string(),
        kind: parsed.unwrap_or(TransactionType::Expense),
        icon: icon.to_string(),
    })
}

pub fn profile(
    username: Option<&str>,
    password: Option<&str>,
) -> Result<ProfileUpdate, ValidationErrors> {
    let mut errs = ValidationErrors::default();
    if username.is_none() && password.is_none() {
        errs.push("profile", "Nothing to update");
    }
    if let Some(u) = username {
        check_username(&mut errs, u);
    }
    if let Some(p) = password {
        check_password(&mut errs, p);
    }
    errs.into_result(|| ProfileUpdate {
        username: username.map(|u| u.trim().to_string()),
        password: password.map(str::to_string),
    })
}
