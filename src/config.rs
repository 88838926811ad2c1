use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub(crate) const DB_ENV: &str = "BUDGETTIER_DB";
pub(crate) const LOG_ENV: &str = "BUDGETTIER_LOG";
const DEFAULT_LOG_FILTER: &str = "budgettier=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    pub(crate) log_path: PathBuf,
    pub(crate) log_filter: String,
}

impl Config {
    /// Resolve paths from the environment, creating the data directory.
    pub(crate) fn from_env() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "budgettier", "BudgetTier")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Self::resolve(
            data_dir,
            std::env::var_os(DB_ENV).map(PathBuf::from),
            std::env::var(LOG_ENV).ok(),
        ))
    }

    pub(crate) fn resolve(
        data_dir: &Path,
        db_override: Option<PathBuf>,
        log_filter: Option<String>,
    ) -> Self {
        let db_path = db_override
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| data_dir.join("budgettier.db"));
        let log_filter = log_filter
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Self {
            db_path,
            log_path: data_dir.join("budgettier.log"),
            log_filter,
        }
    }
}

/// Send tracing output to the log file. Stdout belongs to the TUI.
pub(crate) fn init_tracing(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("Failed to open log file: {}", config.log_path.display()))?;

    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = Config::resolve(Path::new("/data"), None, None);
        assert_eq!(config.db_path, PathBuf::from("/data/budgettier.db"));
        assert_eq!(config.log_path, PathBuf::from("/data/budgettier.log"));
        assert_eq!(config.log_filter, "budgettier=info");
    }

    #[test]
    fn test_resolve_overrides() {
        let config = Config::resolve(
            Path::new("/data"),
            Some(PathBuf::from("/tmp/other.db")),
            Some(" budgettier=debug ".into()),
        );
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.log_filter, "budgettier=debug");
    }

    #[test]
    fn test_resolve_ignores_empty_overrides() {
        let config = Config::resolve(Path::new("/data"), Some(PathBuf::new()), Some("  ".into()));
        assert_eq!(config.db_path, PathBuf::from("/data/budgettier.db"));
        assert_eq!(config.log_filter, "budgettier=info");
    }
}
