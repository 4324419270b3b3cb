use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Per-field validation messages as returned by the backend
/// (`{"errors": {"field": ["msg", ...]}}`).
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Stable client error taxonomy shared by every API call site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A local precondition failed before any network I/O happened.
    #[error("validation failed for '{field}': {reason}")]
    Validation {
        /// Payload field that failed the precondition.
        field: String,
        /// Human-readable reason.
        reason: String,
    },
    /// The request never reached the server (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),
    /// The server rejected the session (HTTP 401). Always paired with a
    /// client-side session teardown by the HTTP layer.
    #[error("session expired")]
    SessionExpired,
    /// Any other non-2xx response, with whatever the server said about it.
    #[error("request failed with status {status}: {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Server-supplied message, or a generic fallback.
        message: String,
        /// Per-field validation errors when the server provided them.
        field_errors: Option<FieldErrors>,
    },
}

impl ApiError {
    /// Build a local validation error for a missing/invalid payload field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller should treat this as a retryable transport problem.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::RequestFailed { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Map a non-2xx HTTP status plus the parsed response body to an `ApiError`.
///
/// 401 always classifies as `SessionExpired`; everything else becomes
/// `RequestFailed` carrying the server message and field errors when the body
/// follows the `{message, errors}` convention.
pub fn error_for_status(status: u16, body: Option<&Value>) -> ApiError {
    if status == 401 {
        return ApiError::SessionExpired;
    }

    let message = body
        .and_then(|value| value.get("message"))
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or("request failed")
        .to_owned();

    let field_errors = body
        .and_then(|value| value.get("errors"))
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(field, messages)| {
                    let texts = messages
                        .as_array()
                        .map(|items| {
                            items
                                .iter()
                                .filter_map(Value::as_str)
                                .map(str::to_owned)
                                .collect::<Vec<_>>()
                        })
                        .unwrap_or_else(|| {
                            messages.as_str().map(str::to_owned).into_iter().collect()
                        });
                    (field.clone(), texts)
                })
                .collect::<FieldErrors>()
        })
        .filter(|map| !map.is_empty());

    ApiError::RequestFailed {
        status,
        message,
        field_errors,
    }
}
