// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde_json::Value;
use thiserror::Error;

pub const GENERIC_MESSAGE: &str =
    "Request failed. Please check your network connection and try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("session expired or not authorized (HTTP {status})")]
    Unauthorized {
        status: u16,
        message: Option<String>,
    },
    #[error("resource not found")]
    NotFound,
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("no session token; please log in again")]
    MissingToken,
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

impl ApiError {
    /// 401/403 responses and a missing token both end the session.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. } | ApiError::MissingToken)
    }

    /// Errors where the request may never have reached the server.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }

    /// Best-effort message for an alert.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Http { .. } => GENERIC_MESSAGE.to_string(),
            ApiError::Unauthorized {
                message: Some(m), ..
            } => m.clone(),
            other => other.to_string(),
        }
    }

    /// Classifies a non-success response, pulling the message out of its body.
    pub fn from_response(status: u16, body: &str) -> ApiError {
        match status {
            401 | 403 => ApiError::Unauthorized {
                status,
                message: extract_message(body),
            },
            404 => ApiError::NotFound,
            _ => ApiError::Http {
                status,
                message: extract_message(body).unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::from_response(status.as_u16(), "")
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Looks for `error`, then `detail`, then per-field validation messages.
pub fn extract_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    let obj = v.as_object()?;
    for key in ["error", "detail"] {
        if let Some(s) = obj.get(key).and_then(Value::as_str) {
            return Some(s.to_string());
        }
    }
    let mut parts = Vec::new();
    for value in obj.values() {
        match value {
            Value::String(s) => parts.push(s.clone()),
            Value::Array(items) => {
                parts.extend(items.iter().filter_map(Value::as_str).map(str::to_string))
            }
            _ => {}
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
