use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use quotawarn_core::{GlobalRepeat, SharingMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Shared-plan usage warnings")]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding notification state between runs
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Usage snapshot to evaluate (.json or .toml)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// How members share the account cap
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Evaluate and print without saving state or writing the outbox
    #[arg(long)]
    pub dry_run: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the remembered notification state of one account resource
    State {
        /// Account id used when the state was saved
        account: String,
        /// Resource name (e.g. "data", "SMS")
        resource: String,
    },
}

/// Sharing mode as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Cooperative,
    Independent,
}

impl From<ModeArg> for SharingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Cooperative => SharingMode::Cooperative,
            ModeArg::Independent => SharingMode::Independent,
        }
    }
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding one state file per account and resource
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// How members share the account cap
    #[serde(default)]
    pub mode: SharingMode,

    /// Whether a sustained account warning is repeated every run
    #[serde(default)]
    pub global_repeat: GlobalRepeat,

    /// Notification outbox settings
    #[serde(default)]
    pub outbox: OutboxSettings,

    /// Report output settings
    #[serde(default)]
    pub report: ReportSettings,
}

fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("quotawarn/state"))
        .unwrap_or_else(|| PathBuf::from(".quotawarn/state"))
}

/// Notification outbox settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxSettings {
    /// Write emitted notifications to the outbox
    #[serde(default = "default_outbox_enabled")]
    pub enabled: bool,

    /// Outbox directory (defaults to the state directory)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Maximum outbox size in bytes before rotation
    #[serde(default = "default_outbox_max_size")]
    pub max_size_bytes: u64,
}

fn default_outbox_enabled() -> bool {
    true
}

/// Default outbox max size (10MB)
fn default_outbox_max_size() -> u64 {
    10_485_760
}

impl Default for OutboxSettings {
    fn default() -> Self {
        Self {
            enabled: default_outbox_enabled(),
            dir: None,
            max_size_bytes: default_outbox_max_size(),
        }
    }
}

/// Report output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Enable color output
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            color: default_color(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            mode: SharingMode::default(),
            global_repeat: GlobalRepeat::default(),
            outbox: OutboxSettings::default(),
            report: ReportSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {:?}", p))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", p));
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("quotawarn/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/quotawarn/config.toml")),
            dirs::home_dir().map(|p| p.join(".quotawarn.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", path));
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(state_dir) = &cli.state_dir {
            self.state_dir = state_dir.clone();
        }
        if let Some(mode) = cli.mode {
            self.mode = mode.into();
        }
        if cli.no_color {
            self.report.color = false;
        }
    }

    /// Validate and normalize settings values
    ///
    /// A zero rotation size would rotate after every line.
    pub fn validate(&mut self) {
        const MIN_OUTBOX_SIZE: u64 = 4096;

        if self.outbox.max_size_bytes < MIN_OUTBOX_SIZE {
            self.outbox.max_size_bytes = MIN_OUTBOX_SIZE;
        }
    }

    /// Directory the outbox writes to
    pub fn outbox_dir(&self) -> PathBuf {
        self.outbox
            .dir
            .clone()
            .unwrap_or_else(|| self.state_dir.clone())
    }
}
