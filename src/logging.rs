use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// The log lives next to the database: `library.sqlite` logs to
/// `library.log`. A database already named `*.log` gets `.log` appended
/// instead, so the two never share a file.
pub fn log_path_for(database: &Path) -> PathBuf {
    let sibling = database.with_extension("log");
    if sibling != database {
        return sibling;
    }
    let mut appended = database.as_os_str().to_owned();
    appended.push(".log");
    PathBuf::from(appended)
}

/// Install the global subscriber. Output goes to a file because the terminal
/// belongs to the UI. `RUST_LOG` takes precedence over `default_filter`.
pub fn init_logging(log_path: &Path, default_filter: &str) -> Result<()> {
    let file = open_log_file(log_path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("failed to install log subscriber")
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sits_next_to_database() {
        assert_eq!(
            log_path_for(Path::new("/data/library.sqlite")),
            PathBuf::from("/data/library.log")
        );
    }

    #[test]
    fn database_named_like_a_log_keeps_a_separate_log() {
        let database = Path::new("/data/loans.log");
        let log = log_path_for(database);
        assert_ne!(log, database);
        assert_eq!(log, PathBuf::from("/data/loans.log.log"));
    }

    #[test]
    fn log_file_is_created_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("library.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
