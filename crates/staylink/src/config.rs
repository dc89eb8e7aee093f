//! CLI configuration -- thin wrapper around `staylink_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-url, --token, --insecure, --timeout).

use secrecy::SecretString;

use staylink_core::MarketplaceConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use staylink_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_for_edit, load_ledger,
    save_config, save_ledger, state_path, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate a `Profile` + global flags into a `MarketplaceConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<MarketplaceConfig, CliError> {
    let mut profile = profile.clone();
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let mut config = staylink_config::profile_to_marketplace_config(&profile, profile_name, defaults)?;

    // The --token flag beats every stored credential.
    if let Some(ref token) = global.token {
        config.session = Some(staylink_config::profile_session(
            &profile,
            SecretString::from(token.clone()),
        )?);
    }

    Ok(config)
}

/// Build a `MarketplaceConfig` from the config file, profile, and flags.
///
/// Without a matching profile, `--api-url` alone is enough for an ad-hoc
/// service-provider session.
pub fn build_marketplace_config(global: &GlobalOpts) -> Result<MarketplaceConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    if global.profile.is_some() {
        return Err(profile_not_found(profile_name, &cfg));
    }

    let url = global.api_url.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    resolve_profile(&Profile::new(url), &profile_name, &cfg.defaults, global)
}

pub fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}
