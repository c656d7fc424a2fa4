//! Clap derive structures for the `cyberq` CLI.
//!
//! Only clap types live here; `build.rs` includes this file to render man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cyberq -- monitor and adjust a CyberQ WiFi BBQ controller
#[derive(Debug, Parser)]
#[command(
    name = "cyberq",
    version,
    about = "Monitor and adjust a BBQ Guru CyberQ WiFi controller",
    long_about = "Reads pit and food probe temperatures, fan output and controller settings \
        from a CyberQ WiFi on the local network, and writes setpoints and settings back.\n\n\
        Devices are addressed by a saved profile (see `cyberq config`) or directly with --host.",
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
    /// Device profile to use
    #[arg(long, short = 'p', env = "CYBERQ_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device hostname or IP address (overrides profile)
    #[arg(long, env = "CYBERQ_HOST", global = true)]
    pub host: Option<String>,

    /// Device HTTP port
    #[arg(long, env = "CYBERQ_PORT", global = true)]
    pub port: Option<u16>,

    /// Poll interval in seconds (minimum 1)
    #[arg(long, env = "CYBERQ_INTERVAL", global = true)]
    pub interval: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, env = "CYBERQ_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "CYBERQ_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
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
    /// Show probe temperatures, setpoints and fan output
    #[command(alias = "st")]
    Status,

    /// List the entities exposed for the device
    #[command(alias = "ls")]
    Entities(EntitiesArgs),

    /// Write one field to the device
    #[command(long_about = "Write one field to the device.\n\n\
        FIELD is a device key such as COOK_SET, FOOD1_SET, ALARMDEV, COOK_RAMP or \
        FOOD2_NAME (case-insensitive). Setpoints are whole degrees F, flags accept \
        on/off, and option fields take their label (e.g. `cyberq set cook_ramp \"Food 1\"`).")]
    Set(SetArgs),

    /// Poll continuously and print each update
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Dump redacted diagnostics for bug reports
    #[command(alias = "diag")]
    Diagnostics,

    /// Check that a host answers like a CyberQ and print its identity
    Probe(ProbeArgs),

    /// Manage device profiles
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Entities ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    /// Include entities that are disabled by default
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Only list entities of this kind
    #[arg(long, short = 'k')]
    pub kind: Option<EntityKindArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKindArg {
    BinarySensor,
    Climate,
    Number,
    Select,
    Sensor,
    Switch,
    Text,
}

// ── Set ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Device field key (e.g. COOK_SET, ALARMDEV, KEY_BEEPS)
    pub field: String,

    /// New value
    pub value: String,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many snapshots
    #[arg(long, short = 'n')]
    pub count: Option<u64>,

    /// Stop after this long (e.g. "90s", "2h 30m")
    #[arg(long = "for", value_name = "DURATION")]
    pub duration: Option<String>,
}

// ── Probe ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Host to probe (defaults to --host or the active profile)
    pub host: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Probe a device and save it as a profile
    Add(ConfigAddArgs),

    /// Remove a profile
    #[command(alias = "rm")]
    Remove {
        /// Profile name
        name: String,
    },

    /// Show the resolved configuration
    Show,

    /// List profiles
    #[command(alias = "ls")]
    List,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct ConfigAddArgs {
    /// Profile name
    pub name: String,

    /// Device hostname or IP address
    #[arg(value_name = "HOST")]
    pub address: String,

    /// Save without contacting the device
    #[arg(long)]
    pub no_probe: bool,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
