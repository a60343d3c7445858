//! Persisted default settings.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory, or `--config PATH`
//! 3. `HALCYON_*` environment variables (e.g. `HALCYON_CONCURRENCY=4`)
//! 4. Command-line flags, merged by [`Config::scan_options`]
//!
//! The result is always turned into an explicit [`ScanOptions`] value
//! before scanning; the walker never reads configuration itself.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::DeleteConfig;
use crate::cli::ScanArgs;
use crate::scanner::{ScanOptions, DEFAULT_CONCURRENCY};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "HALCYON_";

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extensions to include (with leading dot); empty means all
    pub extensions: Vec<String>,
    /// Minimum file size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    /// Maximum file size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    /// Classify files concurrently
    pub parallel: bool,
    /// Maximum number of concurrent classification tasks
    pub concurrency: usize,
    /// Delete permanently instead of using the system trash
    pub permanent_delete: bool,
    /// Directory offered for "move to backup"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            min_size: None,
            max_size: None,
            parallel: true,
            concurrency: DEFAULT_CONCURRENCY,
            permanent_delete: false,
            backup_dir: None,
        }
    }
}

impl Config {
    /// Load the layered configuration, falling back to defaults on error.
    ///
    /// `path` overrides the default file location.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load the layered configuration.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Malformed TOML, bad environment values, or no resolvable config dir.
    pub fn try_load(path: Option<&Path>) -> Result<Self> {
        let file = Self::resolve_path(path)?;
        log::debug!("Loading config from {}", file.display());
        Self::layered(Some(&file), ENV_PREFIX)
    }

    fn layered(file: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment
            .merge(Env::prefixed(env_prefix))
            .extract()
            .context("invalid configuration")
    }

    /// Read a single TOML file on top of the defaults, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Malformed TOML or values of the wrong type.
    pub fn from_file(path: &Path) -> Result<Self> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Write the configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Serialization or filesystem errors.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// The configuration as pretty TOML.
    ///
    /// # Errors
    ///
    /// Serialization errors.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }

    /// `path` if given, otherwise the platform default location.
    ///
    /// # Errors
    ///
    /// The platform config directory cannot be determined.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// `<platform config dir>/halcyon/config.toml`.
    ///
    /// # Errors
    ///
    /// The platform config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "halcyon", "halcyon")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join(CONFIG_FILE))
    }

    /// Merge command-line flags over these settings.
    #[must_use]
    pub fn scan_options(&self, args: &ScanArgs) -> ScanOptions {
        let extensions = if args.extensions.is_empty() {
            &self.extensions
        } else {
            &args.extensions
        };

        ScanOptions::default()
            .with_extensions(extensions.iter().cloned())
            .with_size_bounds(
                args.min_size.or(self.min_size),
                args.max_size.or(self.max_size),
            )
            .with_parallel(args.concurrent.unwrap_or(self.parallel))
            .with_concurrency(args.jobs.unwrap_or(self.concurrency))
    }

    /// Deletion settings for this run.
    #[must_use]
    pub fn delete_config(&self, args: &ScanArgs) -> DeleteConfig {
        if args.permanent || self.permanent_delete {
            DeleteConfig::permanent()
        } else {
            DeleteConfig::trash()
        }
    }

    /// Backup directory offered during review.
    #[must_use]
    pub fn backup_dir(&self, args: &ScanArgs) -> Option<PathBuf> {
        args.backup_dir.clone().or_else(|| self.backup_dir.clone())
    }
}
