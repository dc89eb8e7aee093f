use thiserror::Error;

/// Top-level error type for the `staylink-api` crate.
///
/// One variant per HTTP failure class the marketplace backend produces,
/// plus the transport and decoding failures underneath them.
/// `staylink-core` maps these into its own failure taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// HTTP 401. The session has already been cleared when this is returned.
    #[error("Session expired or invalid: {message}")]
    Unauthorized { message: String },

    /// HTTP 403. The caller's role may not perform this operation.
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// No session is installed, so no bearer token can be sent.
    #[error("Not logged in -- no session token available")]
    NotAuthenticated,

    // ── HTTP status ─────────────────────────────────────────────────
    /// HTTP 404. The backend has no route (or no resource) at `path`.
    #[error("Not found: {path}")]
    NotFound { path: String, message: String },

    /// HTTP 5xx.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request exceeded the caller's deadline.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Server { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` when the backend could not be reached at all, or
    /// answered 404 for a route it does not serve.
    ///
    /// This is the condition under which callers may fall back to
    /// local-only state changes.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::Timeout { .. } => true,
            Self::Transport(e) => {
                e.is_connect() || e.is_timeout() || e.status() == Some(reqwest::StatusCode::NOT_FOUND)
            }
            _ => false,
        }
    }

    /// Returns `true` for HTTP 403.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Returns `true` if the session is gone and the user has to log in again.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::NotAuthenticated)
    }

    /// The backend's `{message}` text, when the response carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::NotFound { message, .. }
            | Self::Server { message, .. }
            | Self::Api { message, .. } => Some(message.as_str()).filter(|m| !m.is_empty()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_timeout_count_as_unreachable() {
        let nf = Error::NotFound {
            path: "/service/categories/spa/activate".into(),
            message: String::new(),
        };
        assert!(nf.is_unreachable());
        assert!(Error::Timeout { timeout_secs: 5 }.is_unreachable());
    }

    #[test]
    fn forbidden_is_not_unreachable() {
        let err = Error::Forbidden {
            message: "nope".into(),
        };
        assert!(err.is_forbidden());
        assert!(!err.is_unreachable());
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn empty_server_message_is_none() {
        let err = Error::Server {
            status: 502,
            message: String::new(),
        };
        assert_eq!(err.server_message(), None);
        assert!(!err.is_unreachable());
    }
}
