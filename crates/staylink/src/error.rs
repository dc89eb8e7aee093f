//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use staylink_config::ConfigError;
use staylink_core::CoreError;

/// Process exit codes.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the marketplace backend: {reason}")]
    #[diagnostic(
        code(staylink::unreachable),
        help(
            "Check the api_url of your profile and your network connection.\n\
             Category changes made while offline are kept; run `staylink categories sync` later."
        )
    )]
    Unreachable { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Session expired")]
    #[diagnostic(
        code(staylink::session_expired),
        help("Store a fresh token with: staylink config set-token")
    )]
    SessionExpired,

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(staylink::no_credentials),
        help(
            "Configure a token with: staylink config set-token\n\
             Or set the STAYLINK_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("{message}")]
    #[diagnostic(code(staylink::forbidden))]
    Forbidden { message: String },

    #[error("The active session has no {field}")]
    #[diagnostic(
        code(staylink::missing_scope),
        help("Run: staylink config set {field} <id>")
    )]
    MissingScope { field: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(staylink::not_found),
        help("Run: staylink {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(staylink::conflict))]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(staylink::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(staylink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(staylink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: staylink config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(staylink::no_config),
        help(
            "Create one with: staylink config init\n\
             Expected at: {path}\n\
             Or pass --api-url and --token."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(staylink::config))]
    Config(Box<figment::Error>),

    #[error(transparent)]
    #[diagnostic(code(staylink::config_store))]
    ConfigStore(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(staylink::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(staylink::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(staylink::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML rendering failed: {0}")]
    #[diagnostic(code(staylink::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } => exit_code::CONNECTION,
            Self::SessionExpired | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::MissingScope { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionExpired => CliError::SessionExpired,

            CoreError::NotLoggedIn => CliError::NoCredentials {
                profile: "current".into(),
            },

            CoreError::MissingSessionScope { field } => CliError::MissingScope {
                field: field.into(),
            },

            CoreError::Forbidden { message } => CliError::Forbidden { message },

            CoreError::Unreachable { reason } => CliError::Unreachable { reason },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Server { status, message } => CliError::ApiError {
                code: format!("http_{status}"),
                message,
            },

            CoreError::Cancelled { key } => CliError::ApiError {
                code: "cancelled".into(),
                message: format!("request for '{key}' was cancelled"),
            },

            CoreError::UnknownCategory { key } => CliError::NotFound {
                resource_type: "category".into(),
                identifier: key,
                list_command: "catalog list".into(),
            },

            err @ CoreError::ComingSoon { .. } => CliError::Validation {
                field: "category".into(),
                reason: err.to_string(),
            },

            err @ CoreError::InvalidTransition { .. } => CliError::Conflict {
                message: err.to_string(),
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command_for(&entity_type).into(),
                resource_type: entity_type,
                identifier,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "api".into(), |s| format!("http_{s}")),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

fn list_command_for(entity_type: &str) -> &'static str {
    match entity_type {
        "housekeeping service" => "housekeeping list",
        "category" => "catalog list",
        _ => "--help",
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Figment(e) => CliError::Config(e),
            other => CliError::ConfigStore(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_and_forbidden_get_distinct_exit_codes() {
        let offline = CliError::from(CoreError::Unreachable {
            reason: "connection refused".into(),
        });
        let denied = CliError::from(CoreError::Forbidden {
            message: "nope".into(),
        });

        assert_eq!(offline.exit_code(), exit_code::CONNECTION);
        assert_eq!(denied.exit_code(), exit_code::PERMISSION);
    }

    #[test]
    fn unknown_category_points_at_catalog() {
        let err = CliError::from(CoreError::UnknownCategory {
            key: "spa".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(
            err,
            CliError::NotFound { ref list_command, .. } if list_command == "catalog list"
        ));
    }

    #[test]
    fn missing_scope_is_a_usage_error() {
        let err = CliError::from(CoreError::MissingSessionScope {
            field: "provider_id",
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert_eq!(err.to_string(), "The active session has no provider_id");
        assert_eq!(
            err.help().unwrap().to_string(),
            "Run: staylink config set provider_id <id>"
        );
    }
}
