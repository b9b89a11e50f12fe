//! Configuration file management for gymdash.
//!
//! Provides a TOML-based config file at `~/.config/gymdash/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gymdash_core::ledger::service::DEFAULT_CONCURRENCY;
use gymdash_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub bulk: BulkSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkSection {
    /// Writes in flight at once during bulk operations.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BulkSection {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the gymdash config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/gymdash` or `~/.config/gymdash`,
/// never `dirs::config_dir()` (which is `~/Library/Application Support` on
/// macOS).
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("gymdash");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("gymdash")
}

/// Return the path to the gymdash config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file. Returns an error if it does not exist.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

/// Serialize and write the config file, creating parent dirs as needed.
/// The file is owner read/write only on Unix.
pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(&config_path(), config)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct GymdashConfig {
    pub db_config: DbConfig,
    pub bulk_concurrency: usize,
}

impl GymdashConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `GYMDASH_DATABASE_URL` env > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Bulk concurrency: `bulk.concurrency` > `DEFAULT_CONCURRENCY`
    pub fn resolve(cli_db_url: Option<&str>) -> Self {
        let file_config = load_config().ok();

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let bulk_concurrency = file_config
            .as_ref()
            .map(|cfg| cfg.bulk.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY)
            .max(1);

        Self {
            db_config: DbConfig::new(db_url),
            bulk_concurrency,
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
