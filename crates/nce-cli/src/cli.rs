//! Clap derive structures for the `nce` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nce -- CLI for Huawei iMaster NCE-Campus site and device management
#[derive(Debug, Parser)]
#[command(
    name = "nce",
    version,
    about = "Manage NCE-Campus sites and devices from the command line",
    long_about = "A CLI for the Huawei iMaster NCE-Campus northbound API (tenant view).\n\n\
        Provides token management, paginated listing, business-identity lookup,\n\
        and idempotent ensure/delete reconciliation for sites and devices.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "NCE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Base URI of the NCE API (overrides profile)
    #[arg(long, short = 'u', env = "NCE_BASE_URI", global = true)]
    pub base_uri: Option<String>,

    /// Access token (X-ACCESS-TOKEN)
    #[arg(long, env = "NCE_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Username for on-the-fly token issuance
    #[arg(long, env = "NCE_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NCE_OUTPUT",
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
    #[arg(long, short = 'k', env = "NCE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "NCE_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
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
    /// Obtain or revoke access tokens
    Auth(AuthArgs),

    /// Manage campus sites
    #[command(alias = "site", alias = "s")]
    Sites(SitesArgs),

    /// Manage campus devices
    #[command(alias = "device", alias = "d")]
    Devices(DevicesArgs),

    /// Look up a resource by name or id
    Lookup(LookupArgs),

    /// Build a device inventory, optionally scoped to sites
    #[command(alias = "inv")]
    Inventory(InventoryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Obtain an access token with username/password
    Login,
    /// Revoke an access token
    Logout,
}

// ── Sites / Devices ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

/// Shared verb set for both managed collections.
#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// List all records (all pages)
    List {
        /// Server-side name filter
        #[arg(long)]
        name: Option<String>,
    },

    /// Show one record by name or id
    Get {
        /// Name or id of the record
        identifier: String,
    },

    /// Reconcile a record toward the desired state (create or update)
    Ensure(EnsureArgs),

    /// Delete a record by name (no-op when absent)
    Delete {
        /// The record's name
        name: String,

        /// Business-key selector, as inline JSON or @file
        #[arg(long)]
        selector: Option<String>,

        /// Report what would change without mutating anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Args)]
pub struct EnsureArgs {
    /// Desired object, as inline JSON or @file; must include "name"
    #[arg(long)]
    pub object: String,

    /// Business-key selector, as inline JSON or @file
    #[arg(long)]
    pub selector: Option<String>,

    /// Target state
    #[arg(long, default_value = "present")]
    pub state: StateArg,

    /// Report what would change without mutating anything
    #[arg(long)]
    pub dry_run: bool,

    /// Dotted paths of lists to compare order-sensitively (repeatable)
    #[arg(long = "ordered-path")]
    pub ordered_paths: Vec<String>,

    /// Match selector values case-insensitively
    #[arg(long)]
    pub ignore_case: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateArg {
    Present,
    Absent,
}

// ── Lookup / Inventory ───────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Resource kind (sites | devices)
    pub resource: String,

    /// Name or id to look up
    pub identifier: String,
}

#[derive(Debug, Args)]
pub struct InventoryArgs {
    /// Restrict to devices of these site ids (repeatable)
    #[arg(long = "site-id")]
    pub site_ids: Vec<String>,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,

    /// Write to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}
