// ── User-facing formatting ──
//
// Currency amounts and the short notices ("toasts") views show after an
// action. Views decide how to render a notice; the wording lives here.

use serde::Serialize;
use strum::Display;

use crate::activation::ActivationOutcome;
use crate::error::{CoreError, FailureKind};

/// Format `amount` with two decimals: `$12.50`, `€12.50`, `12.50 EGP`.
pub fn format_currency(amount: f64, code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    let symbol = match code.as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    };
    let sign = if amount < 0.0 { "-" } else { "" };
    let value = amount.abs();
    match symbol {
        Some(symbol) => format!("{sign}{symbol}{value:.2}"),
        None if code.is_empty() => format!("{sign}{value:.2}"),
        None => format!("{sign}{value:.2} {code}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

impl From<&ActivationOutcome> for Notice {
    fn from(outcome: &ActivationOutcome) -> Self {
        let level = match outcome {
            ActivationOutcome::Confirmed { .. } => NoticeLevel::Success,
            ActivationOutcome::Offline { .. } => NoticeLevel::Warning,
            ActivationOutcome::Busy { .. } => NoticeLevel::Info,
        };
        Self::new(level, outcome.message())
    }
}

impl From<&CoreError> for Notice {
    fn from(err: &CoreError) -> Self {
        match err.kind() {
            FailureKind::Unauthorized => {
                Self::warning("Your session has expired. Please log in again.")
            }
            FailureKind::Forbidden => Self::error(err.to_string()),
            FailureKind::NotFoundOrUnreachable => {
                Self::warning(format!("Could not reach the marketplace: {err}"))
            }
            FailureKind::ServerError => {
                Self::error("The marketplace is having trouble. Please try again later.")
            }
            FailureKind::Validation | FailureKind::Other => Self::error(err.to_string()),
        }
    }
}
