// ── Runtime marketplace configuration ──
//
// Describes how to reach the marketplace backend and who is calling.
// Carries credentials and tuning but never touches disk: the CLI builds a
// `MarketplaceConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use staylink_api::{Session, TlsMode};

use crate::activation::DEFAULT_REQUEST_TIMEOUT;
use crate::loyalty::{DEFAULT_POINTS_RATIO, TierThresholds};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (staging backends with self-signed certs).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for one marketplace backend and one caller.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// REST base URL, e.g. `https://api.example.com/api`.
    pub api_url: Url,
    /// Session to install on start; `None` for anonymous use.
    pub session: Option<Session>,
    pub tls: TlsVerification,
    /// Overall HTTP timeout per request.
    pub timeout: Duration,
    /// Deadline for activation round trips before falling back offline.
    pub request_timeout: Duration,
    /// ISO code used when a price carries no currency of its own.
    pub currency: String,
    /// Loyalty points per currency unit.
    pub points_ratio: f64,
    pub tier_thresholds: TierThresholds,
}

impl MarketplaceConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            session: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            currency: "USD".into(),
            points_ratio: DEFAULT_POINTS_RATIO,
            tier_thresholds: TierThresholds::default(),
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }
}
