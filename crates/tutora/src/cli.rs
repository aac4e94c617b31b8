//! Clap derive structures for the `tutora` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tutora -- book live tutoring sessions from the command line
#[derive(Debug, Parser)]
#[command(
    name = "tutora",
    version,
    about = "Book Tutora tutoring sessions from the command line",
    long_about = "Command-line client for the Tutora learning platform.\n\n\
        Sign in as the account owner, pick a child profile, then browse\n\
        sessions, reserve time slots, and manage the cart and favorites.",
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
    #[arg(long, short = 'p', env = "TUTORA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, env = "TUTORA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Session state file (overrides profile)
    #[arg(long, env = "TUTORA_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TUTORA_OUTPUT",
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

    /// Request timeout in seconds (no timeout when unset)
    #[arg(long, env = "TUTORA_TIMEOUT", global = true)]
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
    /// Sign in as the account owner
    Login(LoginArgs),

    /// Create an account and sign in
    Register(RegisterArgs),

    /// Sign out and forget stored credentials
    Logout,

    /// Show the signed-in account and active child
    Status,

    /// Manage child profiles
    #[command(alias = "kids")]
    Children(ChildrenArgs),

    /// Browse live tutoring sessions
    #[command(alias = "s")]
    Sessions(SessionsArgs),

    /// Reserve a session time slot and add it to the cart
    Reserve(ReserveArgs),

    /// List or cancel reservations
    Reservations(ReservationsArgs),

    /// Manage the cart
    Cart(CartArgs),

    /// Manage favorite content
    #[command(alias = "fav")]
    Favorites(FavoritesArgs),

    /// Follow teachers
    Follow(FollowArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Mobile number (defaults to the profile's `mobile`)
    #[arg(long, short = 'm')]
    pub mobile: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long, short = 'm')]
    pub mobile: String,

    #[arg(long)]
    pub email: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CHILDREN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ChildrenArgs {
    #[command(subcommand)]
    pub command: ChildrenCommand,
}

#[derive(Debug, Subcommand)]
pub enum ChildrenCommand {
    /// List child profiles
    #[command(alias = "ls")]
    List {
        /// Re-fetch from the server instead of using the stored list
        #[arg(long)]
        refresh: bool,
    },

    /// Create a child profile
    Add {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: Option<String>,

        /// Grade level id
        #[arg(long)]
        level: i64,
    },

    /// Make a child profile the active one
    Switch {
        /// Child id
        id: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSIONS & RESERVATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List sessions offered for a grade level
    #[command(alias = "ls")]
    List {
        /// Grade level id (defaults to the active child's level)
        #[arg(long, short = 'l')]
        level: Option<i64>,
    },
}

#[derive(Debug, Args)]
pub struct ReserveArgs {
    /// Session (meeting) id
    pub meeting: i64,

    /// Time slot id (defaults to the session's first slot)
    #[arg(long)]
    pub slot: Option<i64>,

    /// Existing sale to link the reservation to
    #[arg(long)]
    pub sale: Option<i64>,
}

#[derive(Debug, Args)]
pub struct ReservationsArgs {
    #[command(subcommand)]
    pub command: ReservationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReservationsCommand {
    /// List the active child's reservations
    #[command(alias = "ls")]
    List,

    /// Cancel a reservation
    Cancel {
        /// Reservation id
        id: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CART
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show the cart
    #[command(alias = "ls")]
    List,

    /// Add a session or webinar
    Add {
        /// Session (meeting) id
        #[arg(long, conflicts_with = "webinar", required_unless_present = "webinar")]
        meeting: Option<i64>,

        /// Webinar id
        #[arg(long)]
        webinar: Option<i64>,
    },

    /// Remove a cart line
    #[command(alias = "rm")]
    Remove {
        /// Cart item id
        id: i64,
    },

    /// Pay for everything in the cart
    Checkout,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FAVORITES & FOLLOWS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: FavoritesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List favorite content
    #[command(alias = "ls")]
    List,

    /// Flip the favorite flag on a content item
    Toggle {
        /// Content id
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct FollowArgs {
    #[command(subcommand)]
    pub command: FollowCommand,
}

#[derive(Debug, Subcommand)]
pub enum FollowCommand {
    /// Follow or unfollow a teacher as the active child
    Toggle {
        /// Teacher id
        teacher: i64,
    },

    /// Show a teacher's follower count
    Count {
        /// Teacher id
        teacher: i64,
    },
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
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (api_url, mobile, password_env, timeout, ca_cert, state_file)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
