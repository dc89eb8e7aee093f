//! Clap derive structures for the `staylink` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// staylink -- manage hotel marketplace services from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "staylink",
    version,
    about = "Manage hotel marketplace services from the command line",
    long_about = "Activate service categories, tune hotel markups, manage housekeeping\n\
        services and inspect loyalty memberships on a staylink marketplace.\n\n\
        Category changes made while the backend is unreachable are kept locally\n\
        and replayed with `staylink categories sync`.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "STAYLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// REST base URL (overrides profile)
    #[arg(long, env = "STAYLINK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides profile, env and keyring)
    #[arg(long, env = "STAYLINK_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "STAYLINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "STAYLINK_INSECURE", global = true)]
    pub insecure: bool,

    /// HTTP timeout in seconds (overrides profile)
    #[arg(long, env = "STAYLINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the service category catalog
    #[command(alias = "cat")]
    Catalog(CatalogArgs),

    /// Activate and deactivate service categories for a provider
    #[command(alias = "cats", alias = "c")]
    Categories(CategoriesArgs),

    /// Hotel markup percentages and final prices
    #[command(alias = "m")]
    Markup(MarkupArgs),

    /// Manage housekeeping services
    #[command(alias = "hk")]
    Housekeeping(HousekeepingArgs),

    /// Preview operating schedules without touching the backend
    Schedule(ScheduleArgs),

    /// Show the guest's loyalty membership and tier progress
    Loyalty,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Catalog ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List every known category
    #[command(alias = "ls")]
    List {
        /// Only categories delivered in this scope
        #[arg(long, value_enum)]
        scope: Option<ScopeFilter>,
    },

    /// Show one category with its sample items
    Show {
        /// Category key (e.g. laundry)
        key: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeFilter {
    /// Provider-run services outside the hotel
    Outside,
    /// Services run by the hotel itself
    InsideHotel,
}

// ── Categories ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CategoriesArgs {
    /// Provider to act for (defaults to the session's provider)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    #[command(subcommand)]
    pub command: CategoriesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CategoriesCommand {
    /// List categories with their activation state
    #[command(alias = "ls")]
    List,

    /// Show local changes not yet confirmed by the backend
    Status,

    /// Activate a category
    Activate {
        /// Category key
        key: String,
    },

    /// Deactivate a category
    Deactivate {
        /// Category key
        key: String,
    },

    /// Flip a category to the opposite state
    Toggle {
        /// Category key
        key: String,
    },

    /// Replay offline changes against the backend
    Sync,
}

// ── Markup ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MarkupArgs {
    #[command(subcommand)]
    pub command: MarkupCommand,
}

#[derive(Debug, Subcommand)]
pub enum MarkupCommand {
    /// Show markup settings for every category
    #[command(alias = "ls")]
    Show,

    /// Set a category's default markup (clamped to 0-100)
    Set {
        /// Category id
        category: String,
        /// Markup percentage
        #[arg(allow_negative_numbers = true)]
        percent: f64,
    },

    /// Set a per-provider markup override (clamped to 0-100)
    Override {
        /// Category id
        category: String,
        /// Provider id
        provider: String,
        /// Markup percentage
        #[arg(allow_negative_numbers = true)]
        percent: f64,
    },

    /// Remove a per-provider override
    Clear {
        /// Category id
        category: String,
        /// Provider id
        provider: String,
    },

    /// Compute the final guest price for a base price
    Price {
        /// Category id
        category: String,
        /// Base price set by the provider
        base_price: f64,
        /// Provider whose override applies
        #[arg(long, default_value = "")]
        provider: String,
        /// Currency code for display (defaults to the profile's)
        #[arg(long)]
        currency: Option<String>,
    },
}

// ── Housekeeping ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HousekeepingArgs {
    #[command(subcommand)]
    pub command: HousekeepingCommand,
}

#[derive(Debug, Subcommand)]
pub enum HousekeepingCommand {
    /// List housekeeping services
    #[command(alias = "ls")]
    List,

    /// Show one housekeeping service
    Get {
        /// Service id
        id: String,
    },

    /// Create a housekeeping service
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// Base price
        #[arg(long)]
        price: f64,

        #[command(flatten)]
        fields: HousekeepingFields,

        #[command(flatten)]
        schedule: ScheduleEdits,
    },

    /// Update a housekeeping service
    Update {
        /// Service id
        id: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Base price
        #[arg(long)]
        price: Option<f64>,

        #[command(flatten)]
        fields: HousekeepingFields,

        #[command(flatten)]
        schedule: ScheduleEdits,
    },

    /// Delete a housekeeping service
    Delete {
        /// Service id
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct HousekeepingFields {
    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,

    /// Housekeeping category (e.g. cleaning, laundry)
    #[arg(long)]
    pub category: Option<String>,

    /// Currency code for the base price
    #[arg(long)]
    pub currency: Option<String>,

    /// Mark the service active or inactive
    #[arg(long)]
    pub active: Option<bool>,

    /// Mark the service available or unavailable
    #[arg(long)]
    pub available: Option<bool>,
}

// ── Schedule ─────────────────────────────────────────────────────────

// Applied as: --from-file, --daily, --open, --closed, then --copy-from.
#[derive(Debug, Default, Args)]
pub struct ScheduleEdits {
    /// Open every day with these hours (HH:MM-HH:MM)
    #[arg(long, value_name = "START-END")]
    pub daily: Option<String>,

    /// Open one day with these hours (e.g. mon=09:00-17:00)
    #[arg(long, value_name = "DAY=START-END")]
    pub open: Vec<String>,

    /// Close one day (e.g. sun)
    #[arg(long, value_name = "DAY")]
    pub closed: Vec<String>,

    /// Copy one day's settings onto every other day
    #[arg(long, value_name = "DAY")]
    pub copy_from: Option<String>,

    /// Start from a JSON schedule file instead of the default week
    #[arg(long, value_name = "PATH")]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    /// Print the compact summary (e.g. "Mon-Fri: 09:00 - 17:00")
    Summary(ScheduleEdits),

    /// Print all seven days
    Week(ScheduleEdits),
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (e.g. api_url, role, provider_id)
        key: String,
        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to make default
        name: String,
    },

    /// Store a bearer token in the system keyring for the active profile
    SetToken,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
