use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::models::Attribute;

/// Default directory scanned for bench CSV files.
pub const DEFAULT_CSV_DIR: &str = "csv";

/// Default location of the web viewer's data file.
pub const DEFAULT_OUTPUT: &str = "quad_plotter_webapp/templates/data.json";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Compare motor thrust bench results across setups
#[derive(Parser, Debug, Clone)]
#[command(
    name = "thrust-plotter",
    about = "Compare motor thrust bench results across setups",
    version
)]
pub struct Settings {
    /// Directory containing bench CSV files (scanned recursively)
    #[arg(long, default_value = DEFAULT_CSV_DIR)]
    pub csv_dir: PathBuf,

    /// Interchange JSON written for the web viewer
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Optional JSON file receiving the plot series
    #[arg(long)]
    pub series_output: Option<PathBuf>,

    /// Only include these motors (repeatable)
    #[arg(long)]
    pub motor: Vec<String>,

    /// Only include these cell counts (repeatable)
    #[arg(long)]
    pub cells: Vec<String>,

    /// Only include these props (repeatable)
    #[arg(long)]
    pub prop: Vec<String>,

    /// Only include these ESCs (repeatable)
    #[arg(long)]
    pub esc: Vec<String>,

    /// Only include these authors (repeatable)
    #[arg(long)]
    pub author: Vec<String>,

    /// Only include these sessions (repeatable)
    #[arg(long)]
    pub session: Vec<String>,

    /// Merge all values of an attribute into one group (repeatable)
    #[arg(long, value_parser = ["motor", "cells", "prop", "esc", "author", "session"])]
    pub group_by: Vec<String>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.thrust-plotter/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".thrust-plotter").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Failed to clear {}: {}", config_path.display(), e);
            }
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "csv_dir") {
            if let Some(v) = last.csv_dir {
                settings.csv_dir = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "output") {
            if let Some(v) = last.output {
                settings.output = v;
            }
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!("Failed to persist settings to {}: {}", config_path.display(), e);
        }

        settings
    }

    /// Values passed for `attr` on the command line.
    pub fn selected_values(&self, attr: Attribute) -> &[String] {
        match attr {
            Attribute::Motor => &self.motor,
            Attribute::Cells => &self.cells,
            Attribute::Prop => &self.prop,
            Attribute::Esc => &self.esc,
            Attribute::Author => &self.author,
            Attribute::Session => &self.session,
        }
    }

    /// Attributes named by `--group-by`.
    pub fn group_by_attributes(&self) -> Result<Vec<Attribute>> {
        self.group_by.iter().map(|name| name.parse()).collect()
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            csv_dir: Some(s.csv_dir.clone()),
            output: Some(s.output.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
