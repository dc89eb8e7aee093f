// ── Core error types ──
//
// User-facing errors from staylink-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<staylink_api::Error>`
// impl folds transport-layer errors into the marketplace failure taxonomy.

use strum::Display;
use thiserror::Error;

use crate::activation::ActivationPhase;

/// Coarse failure classes. Views pick their reaction (silent logout,
/// toast, offline fallback) from this, never from raw status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// HTTP 401 -- session cleared, user must log in again.
    Unauthorized,
    /// HTTP 403 -- visible message, no state change.
    Forbidden,
    /// HTTP 404 or no network -- offline fallback where supported.
    NotFoundOrUnreachable,
    /// HTTP 5xx.
    ServerError,
    /// Rejected client-side before any request was made.
    Validation,
    Other,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Session expired -- please log in again")]
    SessionExpired,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("The current session has no {field}")]
    MissingSessionScope { field: &'static str },

    // ── Authorization ────────────────────────────────────────────────
    #[error("{message}")]
    Forbidden { message: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Marketplace backend unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Request for '{key}' was cancelled")]
    Cancelled { key: String },

    // ── Category activation ──────────────────────────────────────────
    #[error("Unknown service category: {key}")]
    UnknownCategory { key: String },

    #[error("'{key}' is coming soon and cannot be activated yet")]
    ComingSoon { key: String },

    #[error("Cannot {action} '{key}' while it is {phase}")]
    InvalidTransition {
        key: String,
        action: &'static str,
        phase: ActivationPhase,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::SessionExpired | Self::NotLoggedIn | Self::MissingSessionScope { .. } => {
                FailureKind::Unauthorized
            }
            Self::Forbidden { .. } => FailureKind::Forbidden,
            Self::Unreachable { .. } | Self::Timeout { .. } | Self::NotFound { .. } => {
                FailureKind::NotFoundOrUnreachable
            }
            Self::Server { .. } => FailureKind::ServerError,
            Self::UnknownCategory { .. }
            | Self::ComingSoon { .. }
            | Self::InvalidTransition { .. }
            | Self::ValidationFailed { .. } => FailureKind::Validation,
            Self::Cancelled { .. }
            | Self::Api { .. }
            | Self::Config { .. }
            | Self::Internal(_) => FailureKind::Other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<staylink_api::Error> for CoreError {
    fn from(err: staylink_api::Error) -> Self {
        use staylink_api::Error as ApiError;

        match err {
            ApiError::Unauthorized { .. } => CoreError::SessionExpired,
            ApiError::NotAuthenticated => CoreError::NotLoggedIn,
            ApiError::Forbidden { message } => CoreError::Forbidden {
                message: if message.is_empty() {
                    "You are not authorized to perform this action".into()
                } else {
                    message
                },
            },
            ApiError::NotFound { path, .. } => CoreError::Unreachable {
                reason: format!("no backend route at {path}"),
            },
            ApiError::Server { status, message } => CoreError::Server { status, message },
            ApiError::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::Unreachable {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ApiError::Tls(msg) => CoreError::Unreachable {
                reason: format!("TLS error: {msg}"),
            },
            ApiError::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_keeps_server_message() {
        let err = CoreError::from(staylink_api::Error::Forbidden {
            message: "Only hotel admins may do this".into(),
        });
        assert_eq!(err.kind(), FailureKind::Forbidden);
        assert_eq!(err.to_string(), "Only hotel admins may do this");
    }

    #[test]
    fn not_found_folds_into_unreachable() {
        let err = CoreError::from(staylink_api::Error::NotFound {
            path: "/api/x".into(),
            message: String::new(),
        });
        assert_eq!(err.kind(), FailureKind::NotFoundOrUnreachable);
    }

    #[test]
    fn unauthorized_is_session_expiry() {
        let err = CoreError::from(staylink_api::Error::Unauthorized {
            message: "jwt expired".into(),
        });
        assert!(matches!(err, CoreError::SessionExpired));
        assert_eq!(err.kind(), FailureKind::Unauthorized);
    }
}
