//! Command-line flags and the optional `settings.toml` file.
//!
//! The database location is resolved through a priority chain:
//!
//! 1. `--database` on the command line
//! 2. `database_path` in the settings file
//! 3. `~/.library-loans/library.sqlite`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-loans";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
/// Log filter used when neither `RUST_LOG` nor the settings file set one.
pub const DEFAULT_LOG_FILTER: &str = "library_loans=info";

#[derive(Debug, Parser)]
#[command(name = "library-loans", version, about = "Track library book borrowing records")]
pub struct Cli {
    /// SQLite database file to open (created if missing).
    #[arg(long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Settings file to read instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every borrow record and exit.
    List,
}

/// Contents of `settings.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub database_path: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl Settings {
    /// Load settings from an explicit path, or from the default location when
    /// none is given. A missing default file yields empty settings; a missing
    /// explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_settings_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    /// Parse settings text. Unknown keys are an error.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse settings")
    }

    /// Filter directive for the log subscriber.
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

/// `<config dir>/library-loans/settings.toml`, when the platform has one.
pub fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "library-loans").map(|dirs| dirs.config_dir().join("settings.toml"))
}

/// Pick the database file following the priority chain in the module docs.
pub fn resolve_database_path(cli_override: Option<PathBuf>, settings: &Settings) -> Result<PathBuf> {
    if let Some(path) = cli_override {
        return Ok(path);
    }
    if let Some(path) = &settings.database_path {
        return Ok(path.clone());
    }
    default_database_path()
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_database_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
