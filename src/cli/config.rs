use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::tracker::identity::IdBranch;
use crate::tracker::settings::Settings;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "safetynet",
    version,
    about = "Unsaved-change tracking for form pages, with a scenario replayer"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: safetynet.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay scenario files against the tracker
    Run {
        /// Scenario YAML file or directory of YAML files
        #[arg(long)]
        scenario: String,

        /// Output format: console, junit
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Append a JSONL trace of every step to this file
        #[arg(long)]
        trace: Option<String>,
    },

    /// Print the effective activation settings as YAML
    Defaults {
        #[command(flatten)]
        overrides: SettingsOverrides,
    },
}

/// Settings flags; each one overrides the config file when given.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct SettingsOverrides {
    /// Warning text shown before leaving with unsaved changes
    #[arg(long)]
    pub message: Option<String>,

    /// Selector of the tracked fields
    #[arg(long)]
    pub fields: Option<String>,

    /// Selector of the form(s) whose submit suppresses the warning
    #[arg(long)]
    pub form: Option<String>,

    /// Comma-separated events that count as a change
    #[arg(long, value_delimiter = ',')]
    pub change_events: Option<Vec<String>>,

    /// Watch matching fields added after activation
    #[arg(long, action = clap::ArgAction::Set)]
    pub live: Option<bool>,

    /// Key resolution for fields with an id but no name: use_id or legacy
    #[arg(long, value_parser = parse_id_branch)]
    pub id_branch: Option<IdBranch>,
}

impl SettingsOverrides {
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(message) = &self.message {
            settings.message = message.clone();
        }
        if let Some(fields) = &self.fields {
            settings.fields = fields.clone();
        }
        if let Some(form) = &self.form {
            settings.form = form.clone();
        }
        if let Some(events) = &self.change_events {
            settings.change_events = Settings::parse_events(&events.join(","));
        }
        if let Some(live) = self.live {
            settings.live = live;
        }
        if let Some(id_branch) = self.id_branch {
            settings.id_branch = id_branch;
        }
        settings
    }
}

pub fn parse_id_branch(value: &str) -> Result<IdBranch, String> {
    match value {
        "use_id" | "use-id" => Ok(IdBranch::UseId),
        "legacy" => Ok(IdBranch::Legacy),
        other => Err(format!("unknown id branch '{}' (expected use_id or legacy)", other)),
    }
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `safetynet.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Activation settings used when a scenario declares none
    #[serde(default)]
    pub defaults: Settings,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: "console".to_string(),
            output: None,
        }
    }
}

fn default_console() -> String { "console".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("safetynet.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Map `-v` occurrences to a log level filter.
pub fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
