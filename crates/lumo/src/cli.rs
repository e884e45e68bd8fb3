//! Clap derive structures for the `lumo` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Also compiled by `build.rs` for man page generation, so nothing here
//! may depend on the rest of the crate.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lumo -- control local smart-home lights
#[derive(Debug, Parser)]
#[command(
    name = "lumo",
    version,
    about = "Control lights, rooms and scenes on a local bridge",
    long_about = "Control lights, rooms and scenes on a local lighting bridge.\n\n\
        Pair once with `lumo pair <ip>`, or try everything offline with --demo.",
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
#[allow(clippy::struct_excessive_bools)]
pub struct GlobalOpts {
    /// Bridge profile to use
    #[arg(long, short = 'p', env = "LUMO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Bridge host or IP (overrides profile)
    #[arg(long, short = 'b', env = "LUMO_BRIDGE", global = true)]
    pub bridge: Option<String>,

    /// Bridge application key
    #[arg(long, env = "LUMO_APP_KEY", global = true, hide_env_values = true)]
    pub app_key: Option<String>,

    /// Use the built-in demo home instead of a bridge
    #[arg(long, env = "LUMO_DEMO", global = true)]
    pub demo: bool,

    /// Simulated demo latency in milliseconds
    #[arg(long, global = true, hide = true, default_value = "600")]
    pub demo_latency: u64,

    /// Output format [default: profile setting, else table]
    #[arg(long, short = 'o', env = "LUMO_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, env = "LUMO_COLOR_MODE", default_value = "auto", global = true)]
    pub color_mode: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept the bridge's self-signed TLS certificate
    #[arg(long, short = 'k', env = "LUMO_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "LUMO_TIMEOUT", global = true)]
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
    /// Plain text, one value per line (scripting)
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
    /// Pair with a bridge by pressing its link button
    Pair(PairArgs),

    /// List and control individual lights
    #[command(alias = "l")]
    Lights(LightsArgs),

    /// List and switch rooms
    #[command(alias = "r")]
    Rooms(RoomsArgs),

    /// List and activate scenes
    #[command(alias = "s")]
    Scenes(ScenesArgs),

    /// Inspect bridge devices and the lights they expose
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// Ask the assistant to change lights in plain language
    Ask(AskArgs),

    /// Keep polling and print room summaries when anything changes
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Pair ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PairArgs {
    /// Bridge IP address or host name
    pub ip: String,

    /// Profile to save the bridge under [default: active profile]
    #[arg(long)]
    pub name: Option<String>,

    /// Store the application key in the config file instead of the keyring
    #[arg(long)]
    pub plaintext: bool,

    /// How many times to ask before giving up
    #[arg(long, default_value = "15")]
    pub attempts: u32,
}

// ── Lights ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightsArgs {
    #[command(subcommand)]
    pub command: LightsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightsCommand {
    /// List all lights
    #[command(alias = "ls")]
    List,

    /// Show one light
    Get {
        /// Light ID or name
        light: String,
    },

    /// Turn lights on (ID, name, part of a name, or "all")
    On {
        lights: String,
    },

    /// Turn lights off (ID, name, part of a name, or "all")
    Off {
        lights: String,
    },

    /// Change power, brightness or color
    Set(LightSetArgs),
}

#[derive(Debug, Args)]
pub struct LightSetArgs {
    /// Light ID, name, part of a name, or "all"
    pub lights: String,

    /// Turn on as part of the change
    #[arg(long, conflicts_with = "off")]
    pub on: bool,

    /// Turn off as part of the change
    #[arg(long)]
    pub off: bool,

    /// Brightness percentage (0-100)
    #[arg(long, short = 'B')]
    pub brightness: Option<f64>,

    /// Named color (red, green, blue, ...)
    #[arg(long, short = 'c', conflicts_with_all = ["xy", "mirek"])]
    pub color: Option<String>,

    /// CIE xy chromaticity, as "x,y"
    #[arg(long, conflicts_with = "mirek")]
    pub xy: Option<String>,

    /// Color temperature in mirek (153-500)
    #[arg(long)]
    pub mirek: Option<u16>,
}

// ── Rooms ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RoomsArgs {
    #[command(subcommand)]
    pub command: RoomsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoomsCommand {
    /// List rooms with their aggregate state
    #[command(alias = "ls")]
    List,

    /// Show one room and its lights
    Get {
        /// Room ID or name
        room: String,
    },

    /// Turn every light in a room on
    On {
        /// Room ID or name
        room: String,
    },

    /// Turn every light in a room off
    Off {
        /// Room ID or name
        room: String,
    },
}

// ── Scenes ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScenesArgs {
    #[command(subcommand)]
    pub command: ScenesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScenesCommand {
    /// List scenes
    #[command(alias = "ls")]
    List {
        /// Only scenes belonging to this room (ID or name)
        #[arg(long, short = 'r')]
        room: Option<String>,
    },

    /// Recall a scene
    Activate {
        /// Scene ID or name
        scene: String,
    },
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices and the lights they expose
    #[command(alias = "ls")]
    List,
}

// ── Ask ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AskArgs {
    /// What to do, e.g. "make the kitchen lights blue"
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Completion provider (overrides profile)
    #[arg(long, value_parser = ["anthropic", "openai"])]
    pub provider: Option<String>,

    /// Model name (overrides profile)
    #[arg(long)]
    pub model: Option<String>,

    /// Completion endpoint base URL (overrides profile)
    #[arg(long)]
    pub base_url: Option<String>,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds [default: profile setting, else 5]
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Exit after this many updates
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the configuration with secrets masked
    Show,

    /// Print the config file path
    Path,

    /// Remove a profile and its stored keys
    Clear {
        /// Profile to remove [default: active profile]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
