//! Config subcommand handlers.

use std::fmt::Write;

use dialoguer::{Input, Select};

use staylink_core::Role;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const ROLES: [Role; 5] = [
    Role::ServiceProvider,
    Role::HotelAdmin,
    Role::SuperHotelAdmin,
    Role::Guest,
    Role::SuperAdmin,
];

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking the token.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "request_timeout = {}", cfg.defaults.request_timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        let _ = writeln!(out, "role = \"{}\"", p.role);
        if let Some(ref id) = p.hotel_id {
            let _ = writeln!(out, "hotel_id = \"{id}\"");
        }
        if let Some(ref id) = p.provider_id {
            let _ = writeln!(out, "provider_id = \"{id}\"");
        }
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(timeout) = p.request_timeout {
            let _ = writeln!(out, "request_timeout = {timeout}");
        }
        if let Some(ref currency) = p.currency {
            let _ = writeln!(out, "currency = \"{currency}\"");
        }
        if let Some(ratio) = p.points_ratio {
            let _ = writeln!(out, "points_ratio = {ratio}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn invalid(field: &str, reason: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Prompt for a token and offer keyring or plaintext storage.
///
/// Returns `Some(token)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_token(profile_name: &str) -> Result<Option<String>, CliError> {
    let token = rpassword::prompt_password("Bearer token: ").map_err(prompt_err)?;
    if token.is_empty() {
        return Err(invalid("token", "token cannot be empty"));
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_token(profile_name, &token)?;
        eprintln!("   ✓ Token stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(token))
    }
}

/// Apply one `config set` key to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            url::Url::parse(&value).map_err(|_| invalid("api_url", "must be an absolute URL"))?;
            profile.api_url = value;
        }
        "role" => {
            value.parse::<Role>().map_err(|_| {
                invalid(
                    "role",
                    "must be guest, hotel-admin, super-hotel-admin, service-provider or super-admin",
                )
            })?;
            profile.role = value;
        }
        "hotel_id" | "hotel-id" => profile.hotel_id = Some(value),
        "provider_id" | "provider-id" => profile.provider_id = Some(value),
        "token" => profile.token = Some(value),
        "token_env" | "token-env" => profile.token_env = Some(value),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => {
            profile.insecure = Some(
                value
                    .parse()
                    .map_err(|_| invalid("insecure", "must be 'true' or 'false'"))?,
            );
        }
        "timeout" => {
            profile.timeout = Some(
                value
                    .parse()
                    .map_err(|_| invalid("timeout", "must be a number (seconds)"))?,
            );
        }
        "request_timeout" | "request-timeout" => {
            profile.request_timeout = Some(
                value
                    .parse()
                    .map_err(|_| invalid("request_timeout", "must be a number (seconds)"))?,
            );
        }
        "currency" => profile.currency = Some(value.to_uppercase()),
        "points_ratio" | "points-ratio" => {
            let ratio: f64 = value
                .parse()
                .map_err(|_| invalid("points_ratio", "must be a number"))?;
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(invalid("points_ratio", "must be a positive number"));
            }
            profile.points_ratio = Some(ratio);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: api_url, role, hotel_id, \
                     provider_id, token, token_env, ca_cert, insecure, timeout, \
                     request_timeout, currency, points_ratio"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_for_edit()?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));

            set_profile_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: staylink config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_for_edit()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetToken => {
            let cfg = config::load_config_for_edit()?;
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(config::profile_not_found(profile_name, &cfg));
            }

            let token = rpassword::prompt_password("Bearer token: ").map_err(prompt_err)?;
            if token.is_empty() {
                return Err(invalid("token", "token cannot be empty"));
            }
            config::store_token(&profile_name, &token)?;
            eprintln!("✓ Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

/// Interactive wizard: one profile, written as the default.
fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("staylink configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("API base URL")
        .default("http://localhost:5000/api".into())
        .interact_text()
        .map_err(prompt_err)?;

    let role_labels: Vec<String> = ROLES.iter().map(ToString::to_string).collect();
    let role_index = Select::new()
        .with_prompt("Dashboard role")
        .items(&role_labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let role = ROLES.get(role_index).copied().unwrap_or(Role::ServiceProvider);

    let mut profile = Profile::new(api_url);
    profile.role = role.to_string();

    match role {
        Role::ServiceProvider => {
            let id: String = Input::new()
                .with_prompt("Provider id")
                .interact_text()
                .map_err(prompt_err)?;
            profile.provider_id = Some(id);
        }
        Role::HotelAdmin | Role::SuperHotelAdmin => {
            let id: String = Input::new()
                .with_prompt("Hotel id")
                .interact_text()
                .map_err(prompt_err)?;
            profile.hotel_id = Some(id);
        }
        Role::Guest | Role::SuperAdmin => {}
    }

    profile.token = prompt_token(&profile_name)?;

    let mut cfg = config::load_config_for_edit()?;
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: staylink categories list");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_validates_typed_keys() {
        let mut profile = Profile::new("http://localhost:5000/api");

        set_profile_key(&mut profile, "role", "hotel-admin".into()).unwrap();
        set_profile_key(&mut profile, "currency", "egp".into()).unwrap();
        set_profile_key(&mut profile, "request-timeout", "5".into()).unwrap();

        assert_eq!(profile.role, "hotel-admin");
        assert_eq!(profile.currency.as_deref(), Some("EGP"));
        assert_eq!(profile.request_timeout, Some(5));

        // The keys a missing session scope points the user at.
        set_profile_key(&mut profile, "provider_id", "p-1".into()).unwrap();
        set_profile_key(&mut profile, "hotel_id", "h-1".into()).unwrap();
        assert_eq!(profile.provider_id.as_deref(), Some("p-1"));
        assert_eq!(profile.hotel_id.as_deref(), Some("h-1"));

        assert!(set_profile_key(&mut profile, "role", "janitor".into()).is_err());
        assert!(set_profile_key(&mut profile, "points_ratio", "-1".into()).is_err());
        assert!(set_profile_key(&mut profile, "colour", "red".into()).is_err());
    }

    #[test]
    fn redacted_view_masks_token() {
        let mut cfg = Config::default();
        let mut profile = Profile::new("https://api.example.com/api");
        profile.token = Some("super-secret".into());
        cfg.profiles.insert("prod".into(), profile);

        let out = format_config_redacted(&cfg);
        assert!(out.contains("[profiles.prod]"));
        assert!(out.contains("token = \"****\""));
        assert!(!out.contains("super-secret"));
    }
}
