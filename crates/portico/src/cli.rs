//! Clap derive structures for the `portico` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.
//! Compiled standalone by `build.rs` for man pages, so only clap types
//! may appear here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// portico -- manage portal content from the command line
#[derive(Debug, Parser)]
#[command(
    name = "portico",
    version,
    about = "Manage portal content and access from the command line",
    long_about = "Administer announcements, documents, galleries, news, violation reports,\n\
        roles and users through the portal's administration API.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "PORTICO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "PORTICO_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Access token (overrides profile and keyring)
    #[arg(long, env = "PORTICO_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PORTICO_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, env = "PORTICO_COLOR", default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', env = "PORTICO_QUIET", global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', env = "PORTICO_YES", global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PORTICO_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PORTICO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Manage announcements
    #[command(alias = "ann")]
    Announcements(ContentArgs),

    /// Manage downloadable documents
    #[command(alias = "docs")]
    Documents(ContentArgs),

    /// Manage photo galleries
    #[command(alias = "gal")]
    Galleries(ContentArgs),

    /// Manage news articles
    News(ContentArgs),

    /// Manage violation reports
    #[command(alias = "vio")]
    Violations(ViolationsArgs),

    /// Manage roles
    Roles(AccessArgs),

    /// Manage user accounts
    Users(AccessArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Pagination, filtering and sorting for every list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Records per page (defaults to the profile's page_size)
    #[arg(long, short = 'l')]
    pub page_size: Option<u32>,

    /// Free-text search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter as KEY=VALUE (repeatable). Ranges use FROM..TO.
    /// Examples: "Status=Published", "PublishDate=2024-01-01..2024-02-01"
    #[arg(long, short = 'f', value_name = "KEY=VALUE")]
    pub filter: Vec<String>,

    /// Server-side sort key
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, conflicts_with = "asc", requires = "sort")]
    pub desc: bool,

    /// Sort ascending (default when --sort is given)
    #[arg(long, requires = "sort")]
    pub asc: bool,

    /// Fetch all pages automatically
    #[arg(long, short = 'a', conflicts_with = "page")]
    pub all: bool,
}

/// Body sources for create and update.
#[derive(Debug, Args)]
pub struct WriteArgs {
    /// Read field values from a JSON object file
    #[arg(long, value_name = "FILE")]
    pub from_file: Option<PathBuf>,

    /// Set a field as KEY=VALUE (repeatable, applied after --from-file)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// List, read and write operations every resource offers.
#[derive(Debug, Subcommand)]
pub enum CrudCommand {
    /// List records
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one record
    Get {
        /// Record ID
        id: String,
    },

    /// Create a record
    Create(WriteArgs),

    /// Update a record (unset fields keep their current values)
    Update {
        /// Record ID
        id: String,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record ID
        id: String,
    },
}

// ── Content (announcements, documents, galleries, news) ─────────────

#[derive(Debug, Args)]
pub struct ContentArgs {
    #[command(subcommand)]
    pub command: ContentCommand,
}

#[derive(Debug, Subcommand)]
pub enum ContentCommand {
    #[command(flatten)]
    Crud(CrudCommand),

    /// Publish now, or schedule with --at
    Publish {
        /// Record ID
        id: String,

        /// Publication time (ISO-8601 or YYYY-MM-DD)
        #[arg(long, value_name = "WHEN")]
        at: Option<String>,
    },

    /// Pin to the top of the portal
    Pin {
        /// Record ID
        id: String,

        /// Pin slot (1-9999)
        #[arg(long, default_value = "1")]
        order: String,
    },

    /// Remove a pin
    Unpin {
        /// Record ID
        id: String,
    },

    /// Archive a record
    Archive {
        /// Record ID
        id: String,
    },
}

// ── Violations ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ViolationsArgs {
    #[command(subcommand)]
    pub command: ViolationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ViolationsCommand {
    #[command(flatten)]
    Crud(CrudCommand),

    /// Archive a closed report
    Archive {
        /// Record ID
        id: String,
    },
}

// ── Roles & users ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AccessArgs {
    #[command(subcommand)]
    pub command: CrudCommand,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with guided setup
    Init,

    /// Display the current configuration (secrets redacted)
    Show,

    /// Store an access token in the system keyring
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// List configured profiles
    Profiles,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
