//! Shared configuration for staylink tools.
//!
//! TOML profiles, bearer-token resolution (env + keyring + plaintext), the
//! persisted activation ledger, and translation to
//! `staylink_core::MarketplaceConfig`. The CLI adds flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use staylink_core::{ActivationLedger, MarketplaceConfig, Role, Session, TlsVerification};

const KEYRING_SERVICE: &str = "staylink";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("state file is corrupt: {0}")]
    State(#[from] serde_json::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds before an activation request falls back to offline mode.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_request_timeout() -> u64 {
    15
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// REST base URL (e.g., "https://api.example.com/api").
    pub api_url: String,

    /// Dashboard role of the token's owner.
    #[serde(default = "default_role")]
    pub role: String,

    /// Hotel the session is scoped to (hotel admins).
    pub hotel_id: Option<String>,

    /// Provider the session is scoped to (service providers).
    pub provider_id: Option<String>,

    /// Bearer token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override HTTP timeout (seconds).
    pub timeout: Option<u64>,

    /// Override activation request timeout (seconds).
    pub request_timeout: Option<u64>,

    /// Display currency for prices without their own (ISO code).
    pub currency: Option<String>,

    /// Loyalty points per currency unit.
    pub points_ratio: Option<f64>,
}

fn default_role() -> String {
    "service-provider".into()
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            role: default_role(),
            hotel_id: None,
            provider_id: None,
            token: None,
            token_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            request_timeout: None,
            currency: None,
            points_ratio: None,
        }
    }

    pub fn parsed_role(&self) -> Result<Role, ConfigError> {
        self.role.parse().map_err(|_| ConfigError::Validation {
            field: "role".into(),
            reason: format!(
                "expected guest, hotel-admin, super-hotel-admin, service-provider or super-admin, got '{}'",
                self.role
            ),
        })
    }
}

// ── File paths ──────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "staylink", "staylink")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("staylink");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where offline activation changes are kept between runs.
pub fn state_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("state.json"),
        |dirs| dirs.data_dir().join("state.json"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file; `STAYLINK_` env vars still apply on top
/// (nested keys separated by `__`, e.g. `STAYLINK_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("STAYLINK_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "loaded config");
    Ok(config)
}

/// Load only what the config file holds, for commands that write it back.
///
/// A missing file is an empty config. Environment overrides are left out so
/// a save never persists them, and a malformed file is an error rather than
/// a blank slate that would overwrite the user's profiles.
pub fn load_config_for_edit() -> Result<Config, ConfigError> {
    load_config_file(&config_path())
}

pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Activation ledger ───────────────────────────────────────────────

/// Read the persisted ledger; a missing file is an empty ledger.
pub fn load_ledger(path: &Path) -> Result<ActivationLedger, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ActivationLedger::default()),
        Err(e) => Err(e.into()),
    }
}

pub fn save_ledger(path: &Path, ledger: &ActivationLedger) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(ledger)?)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

/// Resolve a bearer token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a session from a profile and an already-resolved token.
pub fn profile_session(profile: &Profile, token: SecretString) -> Result<Session, ConfigError> {
    let mut session = Session::new(token, profile.parsed_role()?);
    session.hotel_id.clone_from(&profile.hotel_id);
    session.provider_id.clone_from(&profile.provider_id);
    Ok(session)
}

/// Build a `MarketplaceConfig` from a profile, without CLI flag overrides.
///
/// A profile without any token yields an anonymous config.
pub fn profile_to_marketplace_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<MarketplaceConfig, ConfigError> {
    let url: url::Url = profile.api_url.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {}", profile.api_url),
    })?;

    let mut config = MarketplaceConfig::new(url);

    match resolve_token(profile, profile_name) {
        Ok(token) => config.session = Some(profile_session(profile, token)?),
        Err(ConfigError::NoCredentials { .. }) => {
            debug!(profile = profile_name, "no token; continuing anonymously");
        }
        Err(e) => return Err(e),
    }

    config.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.request_timeout =
        Duration::from_secs(profile.request_timeout.unwrap_or(defaults.request_timeout));
    if let Some(ref currency) = profile.currency {
        config.currency.clone_from(currency);
    }
    if let Some(ratio) = profile.points_ratio {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ConfigError::Validation {
                field: "points_ratio".into(),
                reason: format!("must be a positive number, got {ratio}"),
            });
        }
        config.points_ratio = ratio;
    }

    Ok(config)
}
